use crate::report::ReportAccumulator;

const ABNORMALITIES_SNO: u32 = 13;

/// 异常数量（固定值，尚未接入实际数据源）
pub fn extract(report: &mut ReportAccumulator) {
    report.set_actual(
        ABNORMALITIES_SNO,
        "13 Nos",
        "13 nos. of Abnormalities are found.",
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_fixed_count() {
        let mut report = ReportAccumulator::seeded();
        extract(&mut report);
        let row = report.row(13).unwrap();
        assert_eq!(row.actual, "13 Nos");
        assert_eq!(row.remark, "13 nos. of Abnormalities are found.");
        assert_eq!(row.standard, "0 Nos");
    }
}
