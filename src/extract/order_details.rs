use super::HeaderTable;
use crate::format::cell_with_thousands;
use crate::grid::{Cell, Grid};
use crate::models::{ReportRow, Warning, WarningSource};
use crate::report::ReportAccumulator;

/// 财务汇总行：(表头关键字, 序号, 指标, 备注前缀)
const FINANCIAL_COLUMNS: [(&str, u32, &str, &str); 3] = [
    (
        "total payment receive",
        24,
        "CLEAR ORDER VALUE",
        "Total Clear Order value is",
    ),
    (
        "total dispatch price",
        25,
        "TOTAL DISPATCH VALUE",
        "Total dispatch value is",
    ),
    (
        "advance payment",
        26,
        "PENDING",
        "Pending quantity value is",
    ),
];

/// 从 "Clear order details" 工作表的最后一行读取订单金额汇总
///
/// 找不到的列直接跳过，不产生警告。
pub fn extract(grid: Option<&Grid>, report: &mut ReportAccumulator) -> Vec<Warning> {
    let Some(grid) = grid else {
        return vec![Warning::not_found(
            WarningSource::OrderDetails,
            "'Clear order details' sheet not found.",
        )];
    };

    // 最后一行通常是累计合计行
    let table = HeaderTable::from_grid(grid);
    let last_row: Option<&[Cell]> = table.as_ref().and_then(|t| {
        t.rows
            .iter()
            .rev()
            .find(|row| row.iter().any(|cell| !cell.is_blank()))
            .copied()
    });
    let (Some(table), Some(last_row)) = (table.as_ref(), last_row) else {
        return vec![Warning::not_found(
            WarningSource::OrderDetails,
            "'Clear order details' sheet has no data rows.",
        )];
    };

    for (keyword, serial_no, particulars, remark_prefix) in FINANCIAL_COLUMNS {
        let Some(col) = table.column_containing(keyword) else {
            log::debug!("Order column '{}' not found", keyword);
            continue;
        };

        let value = format!("Rs. {}", cell_with_thousands(last_row.get(col), 2));
        let mut row = ReportRow::new(serial_no, particulars, "Rs.", "");
        row.remark = format!("{} {}", remark_prefix, value);
        row.actual = value;
        report.append(row);
    }

    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReportTable;

    fn run(rows: Vec<Vec<Cell>>) -> (ReportTable, Vec<Warning>) {
        let grid = Grid::from_rows(rows);
        let mut report = ReportAccumulator::seeded();
        let warnings = extract(Some(&grid), &mut report);
        let (table, _) = report.finish();
        (table, warnings)
    }

    #[test]
    fn reads_the_last_row_of_each_column() {
        let (table, warnings) = run(vec![
            vec![
                "Party".into(),
                "Total Payment Received (Rs)".into(),
                "TOTAL DISPATCH PRICE".into(),
                "Advance Payment Pending".into(),
            ],
            vec!["A".into(), 10.0.into(), 20.0.into(), 30.0.into()],
            vec!["Total".into(), 1234567.891.into(), 990000.0.into(), 0.5.into()],
        ]);
        assert!(warnings.is_empty());

        let clear = table.get(24).unwrap();
        assert_eq!(clear.particulars, "CLEAR ORDER VALUE");
        assert_eq!(clear.unit, "Rs.");
        assert_eq!(clear.actual, "Rs. 1,234,567.89");
        assert_eq!(clear.remark, "Total Clear Order value is Rs. 1,234,567.89");

        let dispatch = table.get(25).unwrap();
        assert_eq!(dispatch.actual, "Rs. 990,000.00");
        assert_eq!(dispatch.remark, "Total dispatch value is Rs. 990,000.00");

        let pending = table.get(26).unwrap();
        assert_eq!(pending.particulars, "PENDING");
        assert_eq!(pending.remark, "Pending quantity value is Rs. 0.50");
    }

    #[test]
    fn unresolved_columns_are_omitted_without_warning() {
        let (table, warnings) = run(vec![
            vec!["Total Payment Received".into(), "Advance Payment".into()],
            vec![100.0.into(), 50.0.into()],
        ]);
        assert!(warnings.is_empty());
        assert!(table.get(24).is_some());
        assert!(table.get(25).is_none());
        assert!(table.get(26).is_some());
        assert_eq!(table.len(), 17 + 2);
    }

    #[test]
    fn blank_total_renders_as_missing_value() {
        let (table, warnings) = run(vec![
            vec!["Party".into(), "Total Dispatch Price".into()],
            vec!["Total".into(), Cell::Empty],
        ]);
        assert!(warnings.is_empty());
        assert_eq!(table.get(25).unwrap().actual, "Rs. nan");
        assert_eq!(table.get(25).unwrap().remark, "Total dispatch value is Rs. nan");
    }

    #[test]
    fn header_only_sheet_warns() {
        let (table, warnings) = run(vec![vec!["Total Payment Received".into()]]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(table.len(), 17);
    }

    #[test]
    fn missing_sheet_warns() {
        let mut report = ReportAccumulator::seeded();
        let warnings = extract(None, &mut report);
        assert_eq!(warnings[0].message, "'Clear order details' sheet not found.");
        assert_eq!(report.len(), 17);
    }
}
