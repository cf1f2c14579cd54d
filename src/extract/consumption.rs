use crate::format::cell_with_thousands;
use crate::grid::Grid;
use crate::locator::find_date_column;
use crate::models::{Warning, WarningSource};
use crate::report::ReportAccumulator;
use chrono::NaiveDate;

const COAL_SNO: u32 = 17;
const ELECTRICITY_SNO: u32 = 18;

/// 在第 0 列中查找煤耗和电耗所在行
///
/// 整列扫描不提前退出，每个关键字取最后一个匹配行。
fn find_utility_rows(grid: &Grid) -> (Option<usize>, Option<usize>) {
    let mut coal_row = None;
    let mut electricity_row = None;

    for (row_idx, row) in grid.rows().enumerate() {
        let Some(text) = row.first().and_then(|cell| cell.as_text()) else {
            continue;
        };
        let text = text.to_lowercase();
        if text.contains("coal") {
            coal_row = Some(row_idx);
        }
        if text.contains("electri") {
            electricity_row = Some(row_idx);
        }
    }

    (coal_row, electricity_row)
}

/// 从 "coal & elec" 工作表读取目标日期的煤耗和电耗
pub fn extract(grid: Option<&Grid>, target_date: NaiveDate, report: &mut ReportAccumulator) -> Vec<Warning> {
    let Some(grid) = grid else {
        return vec![Warning::not_found(
            WarningSource::Consumption,
            "'coal & elec' sheet not found for consumption processing.",
        )];
    };

    let Some(date_col) = find_date_column(grid, target_date) else {
        return vec![Warning::not_found(
            WarningSource::Consumption,
            format!(
                "No consumption data found for date {}.",
                target_date.format("%Y-%m-%d")
            ),
        )];
    };

    let (coal_row, electricity_row) = find_utility_rows(grid);
    let mut warnings = Vec::new();

    match coal_row {
        Some(row) => {
            let value = cell_with_thousands(grid.get(row, date_col), 0);
            report.set_actual(
                COAL_SNO,
                format!("{} Kg", value),
                format!("Coal consumption is {} Kg.", value),
            );
        }
        None => warnings.push(Warning::not_found(
            WarningSource::Consumption,
            "'Coal' row not found in 'coal & elec' sheet.",
        )),
    }

    match electricity_row {
        Some(row) => {
            let value = cell_with_thousands(grid.get(row, date_col), 0);
            report.set_actual(
                ELECTRICITY_SNO,
                format!("{} Unit", value),
                format!("Electricity consumption is {} unit.", value),
            );
        }
        None => warnings.push(Warning::not_found(
            WarningSource::Consumption,
            "'Electricity' row not found in 'coal & elec' sheet.",
        )),
    }

    warnings
}
