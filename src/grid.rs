//! In-memory workbook model used by the extractors.
//!
//! Sheets are rectangular grids anchored at A1 so that a `(row, col)` pair means the
//! same thing no matter which reader produced the grid.

use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

/// 单元格值
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    /// 公式错误，如 `#DIV/0!`
    Error(String),
}

impl Cell {
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// 用于关键字匹配的小写文本，空单元格返回 `None`
    pub fn search_text(&self) -> Option<String> {
        if self.is_blank() {
            return None;
        }
        Some(self.to_string().to_lowercase())
    }

    /// 仅文本单元格的内容
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// 数值或可解析为数值的文本
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => parse_number_text(s),
            _ => None,
        }
    }

    /// 日期单元格或可解析为日期的文本
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::DateTime(dt) => Some(dt.date()),
            Cell::Text(s) => parse_datetime_text(s).map(|dt| dt.date()),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) | Cell::Error(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::DateTime(dt) => {
                if dt.time() == chrono::NaiveTime::MIN {
                    write!(f, "{}", dt.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S"))
                }
            }
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

impl From<NaiveDate> for Cell {
    fn from(value: NaiveDate) -> Self {
        Cell::DateTime(value.and_time(chrono::NaiveTime::MIN))
    }
}

impl From<NaiveDateTime> for Cell {
    fn from(value: NaiveDateTime) -> Self {
        Cell::DateTime(value)
    }
}

/// 矩形单元格区域，行优先存储
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
    width: usize,
}

impl Grid {
    /// 构建网格，较短的行用空单元格补齐
    pub fn from_rows(mut rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, Cell::Empty);
        }
        Self { rows, width }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// 越界时返回 `None`
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn row(&self, row: usize) -> Option<&[Cell]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

/// 命名工作表
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub grid: Grid,
}

/// 工作簿：按原始顺序排列的工作表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];

// 月份在前的格式优先于日在前的格式
const DATE_FORMATS: [&str; 9] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%Y年%m月%d日",
];

/// 解析文本形式的日期或日期时间
pub fn parse_datetime_text(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    for format in &DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }

    for format in &DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date.and_time(chrono::NaiveTime::MIN));
        }
    }

    None
}

/// 解析数字文本，允许千分位逗号
pub fn parse_number_text(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_pads_ragged_rows() {
        let grid = Grid::from_rows(vec![vec![Cell::from("a")], vec![1.0.into(), 2.0.into()]]);
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.get(0, 1), Some(&Cell::Empty));
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.get(0, 2), None);
    }

    #[test]
    fn search_text_skips_blank_cells() {
        assert_eq!(Cell::Empty.search_text(), None);
        assert_eq!(Cell::from("").search_text(), None);
        assert_eq!(Cell::from("Target MTD").search_text().as_deref(), Some("target mtd"));
        assert_eq!(Cell::from(1500.0).search_text().as_deref(), Some("1500"));
    }

    #[test]
    fn numbers_parse_from_text() {
        assert_eq!(Cell::from("1,250.5").as_f64(), Some(1250.5));
        assert_eq!(Cell::from(" 12 ").as_f64(), Some(12.0));
        assert_eq!(Cell::from("n/a").as_f64(), None);
        assert_eq!(Cell::Bool(true).as_f64(), None);
    }

    #[test]
    fn dates_parse_from_text_and_datetime() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 7).unwrap();
        assert_eq!(Cell::from("2024-05-07").as_date(), Some(date));
        assert_eq!(Cell::from("2024-05-07 13:45:00").as_date(), Some(date));
        assert_eq!(Cell::from("05/07/2024").as_date(), Some(date));
        assert_eq!(Cell::from("07-May-2024").as_date(), Some(date));
        assert_eq!(Cell::from(date).as_date(), Some(date));
        assert_eq!(Cell::from(45419.0).as_date(), None);
        assert_eq!(Cell::from("Coal").as_date(), None);
    }

    #[test]
    fn ambiguous_text_dates_read_month_first() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 7).unwrap();
        assert_eq!(Cell::from("05-07-2024").as_date(), Some(date));
        assert_eq!(Cell::from("05/07/2024").as_date(), Some(date));
        // 月份超过 12 时才按日在前解析
        assert_eq!(Cell::from("25-05-2024").as_date(), NaiveDate::from_ymd_opt(2024, 5, 25));
        assert_eq!(Cell::from("25/05/2024").as_date(), NaiveDate::from_ymd_opt(2024, 5, 25));
    }

    #[test]
    fn datetime_display_drops_midnight() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 7).unwrap();
        assert_eq!(Cell::from(date).to_string(), "2024-05-07");
        let dt = date.and_hms_opt(6, 30, 0).unwrap();
        assert_eq!(Cell::from(dt).to_string(), "2024-05-07 06:30:00");
    }

    #[test]
    fn workbook_looks_up_sheets_by_exact_name() {
        let workbook = Workbook {
            sheets: vec![
                Sheet { name: "OEE".into(), grid: Grid::default() },
                Sheet { name: "Stock".into(), grid: Grid::default() },
            ],
        };
        assert_eq!(workbook.sheet_names(), vec!["OEE", "Stock"]);
        assert!(workbook.sheet("Stock").is_some());
        assert!(workbook.sheet("stock").is_none());
    }
}
