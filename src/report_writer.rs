use crate::excel_parser::datetime_to_excel_serial;
use crate::grid::{Cell, Grid, Workbook as SourceWorkbook};
use crate::models::{AppConfig, ReportTable, REPORT_HEADERS};
use anyhow::{Context, Result};
use regex::Regex;
use rust_xlsxwriter::*;
use std::collections::HashSet;

/// Excel 工作表名称最大长度
const MAX_SHEET_NAME_LEN: usize = 31;

/// 生成仅包含分析表的工作簿
pub fn analysis_workbook(table: &ReportTable, config: &AppConfig) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&config.analysis_sheet_name)?;
    write_analysis_sheet(worksheet, table)?;

    workbook
        .save_to_buffer()
        .context("Failed to serialise analysis workbook")
}

/// 生成分析表加全部原始工作表的工作簿
pub fn full_workbook(
    table: &ReportTable,
    source: &SourceWorkbook,
    config: &AppConfig,
) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let mut used_names = HashSet::new();

    let analysis_name = unique_sheet_name(&config.analysis_sheet_name, &mut used_names)?;
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&analysis_name)?;
    write_analysis_sheet(worksheet, table)?;

    for sheet in &source.sheets {
        let name = unique_sheet_name(&sheet.name, &mut used_names)?;
        if name != sheet.name {
            log::debug!("Sheet '{}' exported as '{}'", sheet.name, name);
        }
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&name)?;
        write_source_sheet(worksheet, &sheet.grid)
            .with_context(|| format!("Failed to copy sheet '{}'", sheet.name))?;
    }

    workbook
        .save_to_buffer()
        .context("Failed to serialise full workbook")
}

fn write_analysis_sheet(worksheet: &mut Worksheet, table: &ReportTable) -> Result<()> {
    // 设置列宽
    worksheet.set_column_width(0, 36)?;
    worksheet.set_column_width(1, 10)?;
    worksheet.set_column_width(2, 16)?;
    worksheet.set_column_width(3, 18)?;
    worksheet.set_column_width(4, 48)?;

    let header_format = Format::new()
        .set_font_size(11)
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_background_color(Color::RGB(0xD3D3D3))
        .set_border(FormatBorder::Thin);

    let cell_format = Format::new()
        .set_font_size(10)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin);

    let wrap_format = Format::new()
        .set_font_size(10)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
        .set_border(FormatBorder::Thin);

    for (col, header) in REPORT_HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (idx, row) in table.rows.iter().enumerate() {
        let excel_row = (idx + 1) as u32;
        for (col, value) in row.cells().iter().enumerate() {
            // 备注列自动换行
            let format = if col == REPORT_HEADERS.len() - 1 {
                &wrap_format
            } else {
                &cell_format
            };
            worksheet.write_string_with_format(excel_row, col as u16, *value, format)?;
        }
    }

    Ok(())
}

/// 按单元格类型原样写出源工作表
fn write_source_sheet(worksheet: &mut Worksheet, grid: &Grid) -> Result<()> {
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    for (row_idx, row) in grid.rows().enumerate() {
        let excel_row = row_idx as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            let excel_col = col_idx as u16;
            match cell {
                Cell::Empty => {}
                Cell::Text(s) | Cell::Error(s) => {
                    worksheet.write_string(excel_row, excel_col, s)?;
                }
                Cell::Number(n) => {
                    worksheet.write_number(excel_row, excel_col, *n)?;
                }
                Cell::Bool(b) => {
                    worksheet.write_boolean(excel_row, excel_col, *b)?;
                }
                Cell::DateTime(dt) => {
                    let format = if dt.time() == chrono::NaiveTime::MIN {
                        &date_format
                    } else {
                        &datetime_format
                    };
                    worksheet.write_number_with_format(
                        excel_row,
                        excel_col,
                        datetime_to_excel_serial(dt),
                        format,
                    )?;
                }
            }
        }
    }

    Ok(())
}

/// 生成合法且不重复的工作表名称（Excel 不区分大小写）
fn unique_sheet_name(name: &str, used: &mut HashSet<String>) -> Result<String> {
    let base = sanitize_sheet_name(name)?;

    let mut candidate = base.clone();
    let mut counter = 2;
    while used.contains(&candidate.to_lowercase()) {
        let suffix = format!(" ({})", counter);
        let keep = MAX_SHEET_NAME_LEN - suffix.chars().count();
        candidate = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
        counter += 1;
    }

    used.insert(candidate.to_lowercase());
    Ok(candidate)
}

/// 去除 Excel 工作表名称中不允许的字符并截断到 31 个字符
fn sanitize_sheet_name(name: &str) -> Result<String> {
    let invalid = Regex::new(r"[\[\]:*?/\\]")?;
    let cleaned = invalid.replace_all(name, "_");
    let cleaned = cleaned.trim_matches('\'');
    let truncated: String = cleaned.chars().take(MAX_SHEET_NAME_LEN).collect();

    if truncated.trim().is_empty() {
        Ok("Sheet".to_string())
    } else {
        Ok(truncated)
    }
}
