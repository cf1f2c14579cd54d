use crate::format::cell_with_thousands;
use crate::grid::{Cell, Grid};
use crate::locator::find_keyword;
use crate::models::{ReportRow, Warning, WarningSource};
use crate::report::{ReportAccumulator, FIRST_DYNAMIC_SERIAL};

const ANCHOR_KEYWORD: &str = "xnbr latex";

/// 库存天数备注，非数值时使用原始文本
fn stock_remark(days: Option<&Cell>) -> String {
    match days.and_then(Cell::as_f64).filter(|value| value.is_finite()) {
        Some(value) => format!("Stock available for {} days.", value.trunc() as i64),
        None => days.map(ToString::to_string).unwrap_or_default(),
    }
}

/// 从 "Gloves Production" 工作表读取原料库存
///
/// 从 "xnbr latex" 所在行开始向下逐行读取，直到该列出现空单元格。
pub fn extract(grid: Option<&Grid>, report: &mut ReportAccumulator) -> Vec<Warning> {
    let Some(grid) = grid else {
        return vec![Warning::not_found(
            WarningSource::Inventory,
            "'Gloves Production' sheet not found for inventory check.",
        )];
    };

    let Some((start_row, start_col)) = find_keyword(grid, ANCHOR_KEYWORD, None) else {
        return vec![Warning::not_found(
            WarningSource::Inventory,
            "'XNBR LATEX' keyword not found for inventory check.",
        )];
    };

    let mut serial_no = FIRST_DYNAMIC_SERIAL;
    for row in start_row..grid.height() {
        let particular = match grid.get(row, start_col) {
            Some(cell) if !cell.is_blank() => cell,
            _ => break,
        };
        let particular_text = particular.to_string();

        let actual = cell_with_thousands(grid.get(row, start_col + 1), 0);
        let mut remark = stock_remark(grid.get(row, start_col + 2));

        if particular_text.to_lowercase().contains(ANCHOR_KEYWORD) {
            // 在途数量列可能不存在
            if let Some(in_transit) = grid.get(row, start_col + 3).filter(|c| !c.is_blank()) {
                remark.push_str(&format!(" {} In transit.", in_transit));
            }
        }

        let mut inventory_row =
            ReportRow::new(serial_no, &particular_text.to_uppercase(), "Kg", "");
        inventory_row.actual = format!("{} Kg", actual);
        inventory_row.remark = remark;
        report.append(inventory_row);
        serial_no += 1;
    }

    log::debug!(
        "Inventory produced {} rows",
        serial_no - FIRST_DYNAMIC_SERIAL
    );
    Vec::new()
}
