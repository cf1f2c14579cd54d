use super::HeaderTable;
use crate::format::{fixed, with_thousands};
use crate::grid::{Cell, Grid};
use crate::models::{Warning, WarningSource};
use crate::report::ReportAccumulator;
use anyhow::{Context, Result};
use chrono::NaiveDate;

/// 停机时所有实际值的占位文本
pub const SHUTDOWN: &str = "Shutdown";

const LINES: [&str; 3] = ["Line 1", "Line 2", "Line 3"];

/// 运行时间低于该值时才在备注中注明停机时长
const FULL_SHIFT_HOURS: f64 = 22.0;

/// OEE 工作表中的一行
#[derive(Debug, Clone, PartialEq)]
pub struct OeeRecord {
    pub date: NaiveDate,
    pub line: String,
    /// 运行时间（小时）
    pub run_time: f64,
    pub total_pcs: f64,
    /// 良品率，0..1
    pub quality: f64,
    /// 0..1
    pub oee: f64,
    /// 停机时间（小时）
    pub downtime: f64,
}

/// 解析后的 OEE 工作表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OeeTable {
    pub records: Vec<OeeRecord>,
}

impl OeeTable {
    /// 按表头解析 OEE 工作表
    ///
    /// 日期无法解析的行被丢弃，缺失或非数值的数字列按 0 处理。
    pub fn from_grid(grid: &Grid) -> Result<Self> {
        let table = HeaderTable::from_grid(grid).context("OEE sheet has no header row")?;
        let column = |name: &str| {
            table
                .column_named(name)
                .with_context(|| format!("OEE sheet has no '{}' column", name))
        };

        let date_col = column("Date")?;
        let line_col = column("Line")?;
        let run_time_col = column("Run-Time")?;
        let total_pcs_col = column("Total-Pcs")?;
        let quality_col = column("Quality")?;
        let oee_col = column("OEE")?;
        let downtime_col = column("Downtime (Hours)")?;

        let mut records = Vec::new();
        for row in &table.rows {
            let Some(date) = row.get(date_col).and_then(Cell::as_date) else {
                continue;
            };
            let number = |col: usize| row.get(col).and_then(Cell::as_f64).unwrap_or(0.0);

            records.push(OeeRecord {
                date,
                line: row
                    .get(line_col)
                    .map(|c| c.to_string().trim().to_string())
                    .unwrap_or_default(),
                run_time: number(run_time_col),
                total_pcs: number(total_pcs_col),
                quality: number(quality_col),
                oee: number(oee_col),
                downtime: number(downtime_col),
            });
        }

        log::debug!("Parsed {} dated OEE rows", records.len());
        Ok(Self { records })
    }
}

/// 填充三条产线的工时、产能、良品率和 OEE（序号 1..=12）
pub fn extract(table: &OeeTable, target_date: NaiveDate, report: &mut ReportAccumulator) -> Vec<Warning> {
    let daily: Vec<&OeeRecord> = table
        .records
        .iter()
        .filter(|record| record.date == target_date)
        .collect();

    if daily.is_empty() {
        return vec![Warning::not_found(
            WarningSource::Oee,
            format!("No OEE data found for {}.", target_date.format("%Y-%m-%d")),
        )];
    }

    for (idx, line) in LINES.iter().enumerate() {
        let base = idx as u32 * 4;
        let (hrs_sno, cap_sno, qual_sno, oee_sno) = (base + 1, base + 2, base + 3, base + 4);

        let record = daily
            .iter()
            .find(|record| record.line.eq_ignore_ascii_case(line));

        match record {
            Some(record) if record.oee > 0.0 => {
                let run_time = fixed(record.run_time, 0);
                let mut remark_hrs = format!("Operation time {} hrs.", run_time);
                if record.run_time < FULL_SHIFT_HOURS && record.downtime > 0.0 {
                    remark_hrs.push_str(&format!(" {} hrs downtime.", fixed(record.downtime, 1)));
                }
                report.set_actual(hrs_sno, format!("{} Hrs", run_time), remark_hrs);

                let capacity = if record.run_time > 0.0 {
                    record.total_pcs / record.run_time
                } else {
                    0.0
                };
                let capacity = with_thousands(capacity, 0);
                report.set_actual(
                    cap_sno,
                    format!("{} Pcs/hrs", capacity),
                    format!("Actual Production rate {} pcs/hr.", capacity),
                );

                let quality = fixed(record.quality * 100.0, 0);
                report.set_actual(
                    qual_sno,
                    format!("{} %", quality),
                    format!("Quality is {}%.", quality),
                );

                let oee = fixed(record.oee * 100.0, 0);
                report.set_actual(oee_sno, format!("{} %", oee), format!("OEE is {}%.", oee));
            }
            _ => {
                log::debug!("{} treated as shut down on {}", line, target_date);
                // 四行都标记停机，但只有工时行写备注
                for sno in [hrs_sno, cap_sno, qual_sno, oee_sno] {
                    if let Some(row) = report.row_mut(sno) {
                        row.actual = SHUTDOWN.to_string();
                    }
                }
                if let Some(row) = report.row_mut(hrs_sno) {
                    row.remark = "Line was Shutdown for the day.".to_string();
                }
            }
        }
    }

    Vec::new()
}
