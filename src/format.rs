use crate::grid::Cell;

/// 千分位格式化，如 `20000.0` 保留 0 位小数 → `"20,000"`
pub fn with_thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return non_finite(value);
    }

    let fixed = format!("{:.*}", decimals, value.abs());
    let (integer_part, fraction_part) = match fixed.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(fixed.len() + integer_part.len() / 3);
    for (idx, ch) in integer_part.chars().enumerate() {
        if idx > 0 && (integer_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut result = String::new();
    if value.is_sign_negative() {
        result.push('-');
    }
    result.push_str(&grouped);
    if let Some(frac) = fraction_part {
        result.push('.');
        result.push_str(frac);
    }
    result
}

/// 固定小数位格式化
pub fn fixed(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return non_finite(value);
    }
    format!("{:.*}", decimals, value)
}

/// 数值单元格按千分位格式化，非数值时退回原始文本
///
/// 空单元格或越界视为缺失值，与 NaN 一样输出 `"nan"`。
pub fn cell_with_thousands(cell: Option<&Cell>, decimals: usize) -> String {
    format_cell(cell, |value| with_thousands(value, decimals))
}

/// 数值单元格按固定小数位格式化，非数值时退回原始文本
pub fn cell_fixed(cell: Option<&Cell>, decimals: usize) -> String {
    format_cell(cell, |value| fixed(value, decimals))
}

fn format_cell<F>(cell: Option<&Cell>, format: F) -> String
where
    F: Fn(f64) -> String,
{
    match cell.filter(|c| !c.is_blank()) {
        Some(c) => match c.as_f64() {
            Some(value) => format(value),
            None => c.to_string(),
        },
        None => format(f64::NAN),
    }
}

fn non_finite(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value > 0.0 {
        "inf".to_string()
    } else {
        "-inf".to_string()
    }
}
