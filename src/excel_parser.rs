use crate::grid::{parse_datetime_text, Cell, Grid, Sheet, Workbook};
use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;

/// 读取工作簿中的全部工作表
pub fn load_workbook(file_path: &Path) -> Result<Workbook> {
    let mut workbook = open_workbook_auto(file_path)
        .with_context(|| format!("Cannot open workbook {:?}", file_path))?;

    let mut sheets = Vec::new();
    for sheet_name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&sheet_name)
            .with_context(|| format!("Cannot read sheet '{}'", sheet_name))?;

        log::debug!(
            "Loaded sheet '{}' ({} x {})",
            sheet_name,
            range.height(),
            range.width()
        );

        sheets.push(Sheet {
            name: sheet_name,
            grid: range_to_grid(&range),
        });
    }

    Ok(Workbook { sheets })
}

/// 将 calamine 区域转换为以 A1 为原点的网格
pub fn range_to_grid(range: &Range<Data>) -> Grid {
    // calamine 的区域从第一个非空单元格开始，需要补回前导空行和空列
    let (start_row, start_col) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); start_row];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; start_col];
        cells.extend(row.iter().map(convert_cell));
        rows.push(cells);
    }

    Grid::from_rows(rows)
}

/// 单元格类型转换
pub fn convert_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        // as_datetime 会处理 1904 日期系统；时长格式保留为数值
        Data::DateTime(dt) if dt.is_datetime() => match dt.as_datetime() {
            Some(value) => Cell::DateTime(value),
            None => Cell::Number(dt.as_f64()),
        },
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) => match parse_datetime_text(s) {
            Some(value) => Cell::DateTime(value),
            None => Cell::Text(s.clone()),
        },
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Error(e.to_string()),
    }
}

/// 日期时间转 Excel 序列号
pub fn datetime_to_excel_serial(value: &NaiveDateTime) -> f64 {
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    let millis = value.signed_duration_since(base).num_milliseconds();
    millis as f64 / 86_400_000.0
}
