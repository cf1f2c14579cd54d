use crate::format::{cell_fixed, cell_with_thousands};
use crate::grid::Grid;
use crate::locator::find_keyword;
use crate::models::{Warning, WarningSource};
use crate::report::ReportAccumulator;

const TARGET_KEYWORD: &str = "target mtd";

/// 关键字只在前 10 行内查找
const TARGET_SCAN_ROWS: usize = 10;

const TARGET_QTY_SNO: u32 = 14;
const TARGET_PERCENT_SNO: u32 = 15;

/// 从 "Gloves Production" 工作表读取月累计目标、实际产量和达成率
///
/// 以关键字单元格 (x, y) 为锚点：目标在 (x, y+1)，实际在 (x+1, y+1)，达成率在 (x+2, y+1)。
pub fn extract(grid: Option<&Grid>, report: &mut ReportAccumulator) -> Vec<Warning> {
    let Some(grid) = grid else {
        return vec![Warning::not_found(
            WarningSource::ProductionTarget,
            "'Gloves Production' sheet not found for production target processing.",
        )];
    };

    let Some((x, y)) = find_keyword(grid, TARGET_KEYWORD, Some(TARGET_SCAN_ROWS)) else {
        return vec![Warning::not_found(
            WarningSource::ProductionTarget,
            "'Target MTD' keyword not found in 'Gloves Production' sheet.",
        )];
    };

    let (Some(target_qty), Some(actual_qty), Some(actual_percent)) = (
        grid.get(x, y + 1),
        grid.get(x + 1, y + 1),
        grid.get(x + 2, y + 1),
    ) else {
        return vec![Warning::out_of_range(
            WarningSource::ProductionTarget,
            "Could not find production target values in the expected cells.",
        )];
    };

    let target_qty = cell_with_thousands(Some(target_qty), 0);
    let actual_qty = cell_with_thousands(Some(actual_qty), 0);
    let actual_percent = cell_fixed(Some(actual_percent), 1);

    if let Some(row) = report.row_mut(TARGET_QTY_SNO) {
        row.standard = format!("{} Pcs", target_qty);
        row.actual = format!("{} Pcs", actual_qty);
        row.remark = format!("Actual production is {} pcs.", actual_qty);
    }
    if let Some(row) = report.row_mut(TARGET_PERCENT_SNO) {
        row.standard = "100 %".to_string();
        row.actual = format!("{} %", actual_percent);
        row.remark = format!("Achievement is {}%.", actual_percent);
    }

    Vec::new()
}
