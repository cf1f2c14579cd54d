//! Heuristic location of sheets and cells inside loosely structured workbooks.

use crate::grid::{Cell, Grid};
use chrono::NaiveDate;

/// 按关键字查找工作表（不区分大小写，取第一个匹配）
pub fn find_sheet_by_keyword<'a, I>(sheet_names: I, keyword: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let keyword = keyword.to_lowercase();
    sheet_names
        .into_iter()
        .find(|name| name.to_lowercase().contains(&keyword))
}

/// 行优先扫描网格，返回第一个满足条件的单元格坐标
///
/// `row_bound` 限制只扫描前 N 行。
pub fn scan<F>(grid: &Grid, predicate: F, row_bound: Option<usize>) -> Option<(usize, usize)>
where
    F: Fn(&Cell) -> bool,
{
    let limit = row_bound.map_or(grid.height(), |bound| bound.min(grid.height()));
    grid.rows()
        .take(limit)
        .enumerate()
        .find_map(|(row_idx, row)| {
            row.iter()
                .position(|cell| predicate(cell))
                .map(|col_idx| (row_idx, col_idx))
        })
}

/// 查找包含关键字的第一个单元格
pub fn find_keyword(grid: &Grid, keyword: &str, row_bound: Option<usize>) -> Option<(usize, usize)> {
    let keyword = keyword.to_lowercase();
    scan(
        grid,
        |cell| {
            cell.search_text()
                .is_some_and(|text| text.contains(&keyword))
        },
        row_bound,
    )
}

/// 查找日期等于目标日期的第一个单元格所在列
pub fn find_date_column(grid: &Grid, target: NaiveDate) -> Option<usize> {
    scan(grid, |cell| cell.as_date() == Some(target), None).map(|(_, col)| col)
}
