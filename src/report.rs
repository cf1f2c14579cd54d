//! Report accumulator and the assembler that runs every extractor over a workbook.

use crate::extract::{
    abnormalities, consumption, inventory, oee, order_details, production_target,
    CONSUMPTION_SHEET_KEYWORD, OEE_SHEET_KEYWORD, ORDER_SHEET_KEYWORD,
    PRODUCTION_SHEET_KEYWORD,
};
use crate::grid::{Grid, Workbook};
use crate::locator::find_sheet_by_keyword;
use crate::models::{ReportRow, ReportTable, Warning, WarningSource};
use anyhow::{bail, Result};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// 预置行：(序号, 指标, 单位, 标准值)。序号 16 有意留空。
const SEED_ROWS: [(u32, &str, &str, &str); 17] = [
    (1, "LINE 1 Working Hrs.", "Hrs", "22 Hrs"),
    (2, "LINE 1 Production Capacity", "Pcs/hrs", "18181 Pcs/hrs"),
    (3, "LINE 1 Quality", "%", "100 %"),
    (4, "LINE 1 OEE", "%", "80 %"),
    (5, "LINE 2 Working Hrs.", "Hrs", "22 Hrs"),
    (6, "LINE 2 Production Capacity", "Pcs/hrs", "22727 Pcs/hrs"),
    (7, "LINE 2 Quality", "%", "100 %"),
    (8, "LINE 2 OEE", "%", "80 %"),
    (9, "LINE 3 Working Hrs.", "Hrs", "22 Hrs"),
    (10, "LINE 3 Production Capacity", "Pcs/hrs", "22727 Pcs/hrs"),
    (11, "LINE 3 Quality", "%", "100 %"),
    (12, "LINE 3 OEE", "%", "80 %"),
    (13, "ABNORMALITIES (1+2+3)", "Nos", "0 Nos"),
    (14, "PRODUCTION TARGET (Qty/day)", "Pcs", ""),
    (15, "PRODUCTION TARGET (in %)", "%", ""),
    (17, "COAL CONSUMPTION PER DAY", "Kg", ""),
    (18, "ELECTRICITY CONSUMPTION PER DAY", "Unit", ""),
];

/// 第一个动态行的序号
pub const FIRST_DYNAMIC_SERIAL: u32 = 19;

/// 按序号索引的报表行集合
#[derive(Debug, Clone, Default)]
pub struct ReportAccumulator {
    rows: Vec<ReportRow>,
}

impl ReportAccumulator {
    /// 创建带 17 个预置行的累加器
    pub fn seeded() -> Self {
        let rows = SEED_ROWS
            .iter()
            .map(|(serial, particulars, unit, standard)| {
                ReportRow::new(*serial, particulars, unit, standard)
            })
            .collect();
        Self { rows }
    }

    pub fn row(&self, serial_no: u32) -> Option<&ReportRow> {
        self.rows.iter().find(|row| row.serial_no == serial_no)
    }

    pub fn row_mut(&mut self, serial_no: u32) -> Option<&mut ReportRow> {
        self.rows.iter_mut().find(|row| row.serial_no == serial_no)
    }

    /// 写入某一行的实际值和备注
    pub fn set_actual(&mut self, serial_no: u32, actual: impl Into<String>, remark: impl Into<String>) {
        if let Some(row) = self.row_mut(serial_no) {
            row.actual = actual.into();
            row.remark = remark.into();
        }
    }

    /// 追加动态行
    pub fn append(&mut self, row: ReportRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 按序号排序生成最终报表
    ///
    /// 排序是稳定的：序号相同的行保持追加顺序，并各产生一条冲突警告。
    pub fn finish(mut self) -> (ReportTable, Vec<Warning>) {
        self.rows.sort_by_key(|row| row.serial_no);

        let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.serial_no).or_insert(0) += 1;
        }
        let warnings = counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(serial, count)| {
                Warning::conflict(
                    WarningSource::Assembly,
                    format!("Serial number {} is used by {} report rows.", serial, count),
                )
            })
            .collect();

        (ReportTable { rows: self.rows }, warnings)
    }
}

/// 对一个工作簿生成指定日期的报表
///
/// 找不到 OEE 工作表时返回错误；其余问题都作为警告返回。
pub fn generate_report(workbook: &Workbook, target_date: NaiveDate) -> Result<(ReportTable, Vec<Warning>)> {
    let oee_grid = locate_sheet(workbook, OEE_SHEET_KEYWORD);
    let production_grid = locate_sheet(workbook, PRODUCTION_SHEET_KEYWORD);
    let consumption_grid = locate_sheet(workbook, CONSUMPTION_SHEET_KEYWORD);
    let order_grid = locate_sheet(workbook, ORDER_SHEET_KEYWORD);

    let Some(oee_grid) = oee_grid else {
        bail!("Could not find 'OEE' sheet. Cannot proceed.");
    };
    let oee_table = oee::OeeTable::from_grid(oee_grid)?;

    let mut report = ReportAccumulator::seeded();
    let mut warnings = Vec::new();

    warnings.extend(oee::extract(&oee_table, target_date, &mut report));
    abnormalities::extract(&mut report);
    warnings.extend(production_target::extract(production_grid, &mut report));
    warnings.extend(consumption::extract(consumption_grid, target_date, &mut report));
    warnings.extend(inventory::extract(production_grid, &mut report));
    warnings.extend(order_details::extract(order_grid, &mut report));

    let (table, conflicts) = report.finish();
    warnings.extend(conflicts);

    log::debug!(
        "Report for {} has {} rows and {} warnings",
        target_date,
        table.len(),
        warnings.len()
    );

    Ok((table, warnings))
}

fn locate_sheet<'a>(workbook: &'a Workbook, keyword: &str) -> Option<&'a Grid> {
    let name = find_sheet_by_keyword(workbook.sheet_names(), keyword)?;
    log::debug!("Sheet '{}' matched keyword '{}'", name, keyword);
    workbook.sheet(name).map(|sheet| &sheet.grid)
}
