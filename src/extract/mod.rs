//! KPI extractors. Each one reads its own sheet and writes a disjoint set of report
//! rows; recoverable problems come back as warnings instead of errors.

pub mod abnormalities;
pub mod consumption;
pub mod inventory;
pub mod oee;
pub mod order_details;
pub mod production_target;

use crate::grid::{Cell, Grid};

pub const OEE_SHEET_KEYWORD: &str = "oee";
pub const PRODUCTION_SHEET_KEYWORD: &str = "Gloves Production";
pub const CONSUMPTION_SHEET_KEYWORD: &str = "coal & elec";
pub const ORDER_SHEET_KEYWORD: &str = "Clear order details";

/// 带表头的工作表：第一个非空行为表头，其后为数据行
pub struct HeaderTable<'a> {
    pub headers: Vec<String>,
    pub rows: Vec<&'a [Cell]>,
}

impl<'a> HeaderTable<'a> {
    pub fn from_grid(grid: &'a Grid) -> Option<Self> {
        let header_idx = grid
            .rows()
            .position(|row| row.iter().any(|cell| !cell.is_blank()))?;

        let headers = grid
            .row(header_idx)?
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();
        let rows = grid.rows().skip(header_idx + 1).collect();

        Some(Self { headers, rows })
    }

    /// 第一个满足条件的表头所在列
    pub fn column<F>(&self, matches: F) -> Option<usize>
    where
        F: Fn(&str) -> bool,
    {
        self.headers.iter().position(|header| matches(header))
    }

    /// 表头名称精确匹配（忽略大小写和首尾空白）
    pub fn column_named(&self, name: &str) -> Option<usize> {
        let name = name.trim().to_lowercase();
        self.column(|header| header.to_lowercase() == name)
    }

    /// 表头包含关键字（忽略大小写）
    pub fn column_containing(&self, keyword: &str) -> Option<usize> {
        let keyword = keyword.to_lowercase();
        self.column(|header| header.to_lowercase().contains(&keyword))
    }
}
