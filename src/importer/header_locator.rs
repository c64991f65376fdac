// ==========================================
// 物料需求核对系统 - 表头定位器
// ==========================================
// 职责: 在工作表前 N 行中查找包含全部期望列名的表头行
// 容错: 列顺序任意 / 多余列 / 首尾空白 / 表头跨两行
// 失败: 返回 None，由调用方记录日志并跳过该表
// ==========================================

use crate::config::{ColumnRule, HeaderScanConfig};
use crate::domain::grid::CellGrid;
use crate::domain::types::CellValue;
use tracing::debug;

/// 列名归一化：TRIM + 合并连续空白 + 大写
pub fn normalize_label(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

// ==========================================
// ExpectedColumn - 一个期望列（任一别名命中即可）
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedColumn {
    tokens: Vec<String>,
}

impl ExpectedColumn {
    pub fn new<S: AsRef<str>>(aliases: &[S]) -> Self {
        Self {
            tokens: aliases
                .iter()
                .map(|a| normalize_label(a.as_ref()))
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    pub fn single(token: &str) -> Self {
        Self::new(&[token])
    }

    pub fn from_rule(rule: &ColumnRule) -> Self {
        Self::new(&rule.aliases)
    }

    pub fn matches(&self, normalized_label: &str) -> bool {
        self.tokens.iter().any(|t| t == normalized_label)
    }

    /// 在表头标签中查找本列位置（首个命中列）
    pub fn find_in(&self, labels: &[String]) -> Option<usize> {
        labels.iter().position(|l| self.matches(l))
    }
}

// ==========================================
// HeaderMatch - 表头定位结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderMatch {
    pub row_index: usize,    // 表头首行索引（0 起）
    pub span: usize,         // 表头占用行数（1 或 2）
    pub labels: Vec<String>, // 每列归一化后的标签
}

impl HeaderMatch {
    /// 数据行起始索引
    pub fn data_start(&self) -> usize {
        self.row_index + self.span
    }
}

// ==========================================
// HeaderLocator - 表头定位器
// ==========================================
#[derive(Debug, Clone)]
pub struct HeaderLocator {
    max_rows: usize,
    allow_two_row_headers: bool,
}

impl HeaderLocator {
    pub fn new(max_rows: usize, allow_two_row_headers: bool) -> Self {
        Self {
            max_rows,
            allow_two_row_headers,
        }
    }

    pub fn from_config(config: &HeaderScanConfig) -> Self {
        Self::new(config.max_rows, config.allow_two_row_headers)
    }

    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    /// 自上而下扫描，返回首个命中的表头
    pub fn locate(&self, grid: &CellGrid, expected: &[ExpectedColumn]) -> Option<HeaderMatch> {
        if expected.is_empty() {
            return None;
        }

        let window = self.max_rows.min(grid.row_count());
        for row_index in 0..window {
            let labels = single_row_labels(grid, row_index);
            if all_present(&labels, expected) {
                debug!(row_index, "表头定位成功（单行）");
                return Some(HeaderMatch {
                    row_index,
                    span: 1,
                    labels,
                });
            }

            if !self.allow_two_row_headers || row_index + 1 >= grid.row_count() {
                continue;
            }

            let combined = two_row_labels(grid, row_index);
            // 下一行自身即为完整表头时，留给下一轮以单行命中
            if all_present(&combined, expected)
                && !all_present(&single_row_labels(grid, row_index + 1), expected)
            {
                debug!(row_index, "表头定位成功（跨两行）");
                return Some(HeaderMatch {
                    row_index,
                    span: 2,
                    labels: combined,
                });
            }
        }

        None
    }
}

fn cell_label(cell: &CellValue) -> String {
    normalize_label(&cell.as_trimmed_text())
}

fn single_row_labels(grid: &CellGrid, row_index: usize) -> Vec<String> {
    grid.row(row_index)
        .map(|row| row.iter().map(cell_label).collect())
        .unwrap_or_default()
}

/// 两行表头按列拼接（上 + 空格 + 下）
fn two_row_labels(grid: &CellGrid, row_index: usize) -> Vec<String> {
    let width = grid
        .row(row_index)
        .map(|r| r.len())
        .unwrap_or(0)
        .max(grid.row(row_index + 1).map(|r| r.len()).unwrap_or(0));

    (0..width)
        .map(|col| {
            let top = cell_label(grid.cell(row_index, col));
            let bottom = cell_label(grid.cell(row_index + 1, col));
            normalize_label(&format!("{} {}", top, bottom))
        })
        .collect()
}

fn all_present(labels: &[String], expected: &[ExpectedColumn]) -> bool {
    expected.iter().all(|column| column.find_in(labels).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected(tokens: &[&str]) -> Vec<ExpectedColumn> {
        tokens.iter().map(|t| ExpectedColumn::single(t)).collect()
    }

    #[test]
    fn test_locate_after_title_rows() {
        let grid = CellGrid::from_text_rows(&[
            vec!["WORK ORDER", "", ""],
            vec!["Job No.: 123", "", ""],
            vec!["  units ", "Material", "Remarks"],
            vec!["KG", "Copper", ""],
        ]);

        let found = HeaderLocator::new(20, false)
            .locate(&grid, &expected(&["MATERIAL", "UNITS"]))
            .unwrap();

        assert_eq!(found.row_index, 2);
        assert_eq!(found.span, 1);
        assert_eq!(found.data_start(), 3);
        assert_eq!(found.labels[0], "UNITS");
    }

    #[test]
    fn test_first_matching_row_wins() {
        let grid = CellGrid::from_text_rows(&[
            vec!["Material", "Units"],
            vec!["Material", "Units"],
        ]);
        let found = HeaderLocator::new(20, false)
            .locate(&grid, &expected(&["MATERIAL", "UNITS"]))
            .unwrap();
        assert_eq!(found.row_index, 0);
    }

    #[test]
    fn test_not_found_outside_window() {
        let mut rows: Vec<Vec<&str>> = (0..5).map(|_| vec!["title", ""]).collect();
        rows.push(vec!["Material", "Units"]);
        let grid = CellGrid::from_text_rows(&rows);

        let locator = HeaderLocator::new(5, true);
        assert!(locator
            .locate(&grid, &expected(&["MATERIAL", "UNITS"]))
            .is_none());

        let locator = HeaderLocator::new(6, true);
        assert_eq!(
            locator
                .locate(&grid, &expected(&["MATERIAL", "UNITS"]))
                .unwrap()
                .row_index,
            5
        );
    }

    #[test]
    fn test_partial_header_is_not_a_match() {
        let grid = CellGrid::from_text_rows(&[vec!["Material", "Qty"]]);
        assert!(HeaderLocator::new(20, true)
            .locate(&grid, &expected(&["MATERIAL", "UNITS"]))
            .is_none());
    }

    #[test]
    fn test_two_row_header_concatenated() {
        let grid = CellGrid::from_text_rows(&[
            vec!["Material", "QTY/", "No. of"],
            vec!["", "UNIT", "units"],
            vec!["Copper", "5", "20"],
        ]);

        let found = HeaderLocator::new(20, true)
            .locate(&grid, &expected(&["MATERIAL", "QTY/ UNIT", "NO. OF UNITS"]))
            .unwrap();

        assert_eq!(found.row_index, 0);
        assert_eq!(found.span, 2);
        assert_eq!(found.data_start(), 2);
        assert_eq!(found.labels[1], "QTY/ UNIT");

        // 关闭跨行表头时不命中
        assert!(HeaderLocator::new(20, false)
            .locate(&grid, &expected(&["MATERIAL", "QTY/ UNIT", "NO. OF UNITS"]))
            .is_none());
    }

    #[test]
    fn test_blank_row_above_header_prefers_single_row() {
        let grid = CellGrid::from_text_rows(&[
            vec!["", ""],
            vec!["Material", "Units"],
            vec!["Copper", "KG"],
        ]);
        let found = HeaderLocator::new(20, true)
            .locate(&grid, &expected(&["MATERIAL", "UNITS"]))
            .unwrap();
        assert_eq!(found.row_index, 1);
        assert_eq!(found.span, 1);
    }

    #[test]
    fn test_alias_variants() {
        let column = ExpectedColumn::new(&["Units", "Specifications"]);
        let grid = CellGrid::from_text_rows(&[vec!["Material", "SPECIFICATIONS"]]);
        let found = HeaderLocator::new(20, false)
            .locate(&grid, &[ExpectedColumn::single("material"), column])
            .unwrap();
        assert_eq!(found.row_index, 0);
    }

    #[test]
    fn test_returned_row_contains_every_token() {
        let grid = CellGrid::from_text_rows(&[
            vec!["Material"],
            vec!["Units", "x"],
            vec!["x", "Units", "Material", "Extra"],
        ]);
        let tokens = expected(&["MATERIAL", "UNITS"]);
        let found = HeaderLocator::new(20, true).locate(&grid, &tokens).unwrap();
        for column in &tokens {
            assert!(column.find_in(&found.labels).is_some());
        }
    }
}
