// ==========================================
// 物料需求核对系统 - 抬头元数据提取器
// ==========================================
// 职责: 扫描表头上方的自由文本，提取 作业号 / 客户 / 订单数量
// 规则: 标签大小写不敏感、子串匹配；多次命中时后出现者覆盖先出现者
// 红线: 尽力而为，任何情况下都不使管道失败
// ==========================================

use crate::config::MetadataLabels;
use crate::domain::grid::CellGrid;
use crate::domain::material::DocumentMetadata;
use crate::importer::error::{ImportError, ImportResult};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use tracing::debug;

// 单个数量: 千分位分组或连续数字，可带小数（"1,000" / "2.5" / "20"）
const QTY_PART: &str = r"(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?";

// 数量: 一个或多个数量，可带 "+数量" 重复（如 "20+5"）
static ORDER_QTY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"{0}(?:\s*\+\s*{0})*", QTY_PART)).expect("order qty regex pattern is valid")
});

static QTY_PARTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(QTY_PART).expect("qty part regex pattern is valid"));

pub struct MetadataExtractor {
    job_labels: Vec<Regex>,
    customer_labels: Vec<Regex>,
    order_qty_labels: Vec<Regex>,
}

impl MetadataExtractor {
    pub fn new(labels: &MetadataLabels) -> ImportResult<Self> {
        Ok(Self {
            job_labels: compile_labels(&labels.job_number)?,
            customer_labels: compile_labels(&labels.customer)?,
            order_qty_labels: compile_labels(&labels.order_qty)?,
        })
    }

    /// 扫描 [0, limit) 行
    pub fn extract(&self, grid: &CellGrid, limit: usize) -> DocumentMetadata {
        let mut metadata = DocumentMetadata::default();
        let limit = limit.min(grid.row_count());

        for row_index in 0..limit {
            let Some(row) = grid.row(row_index) else {
                continue;
            };
            let texts: Vec<String> = row.iter().map(|c| c.as_trimmed_text()).collect();

            for (col, text) in texts.iter().enumerate() {
                if text.is_empty() {
                    continue;
                }

                if let Some(value) = self.labelled_value(&self.job_labels, &texts, col) {
                    if let Some(token) = value.split_whitespace().last() {
                        debug!(row_index, job_number = token, "提取作业号");
                        metadata.job_number = Some(token.to_string());
                    }
                }

                if let Some(value) = self.labelled_value(&self.customer_labels, &texts, col) {
                    debug!(row_index, client = %value, "提取客户名");
                    metadata.client_name = Some(value);
                }

                if let Some(value) = self.labelled_value(&self.order_qty_labels, &texts, col) {
                    if let Some(qty) = parse_order_qty(&value) {
                        debug!(row_index, qty, "提取订单数量");
                        metadata.top_level_qty = qty;
                    }
                }
            }
        }

        metadata
    }

    /// 标签后的值：同单元格标签之后的文本；为空时取同行下一个非空单元格
    ///
    /// 下一个非空单元格本身含任一已配置标签时视为缺值
    fn labelled_value(&self, labels: &[Regex], texts: &[String], col: usize) -> Option<String> {
        let text = &texts[col];
        let found = labels.iter().find_map(|re| re.find(text))?;

        let remainder = text[found.end()..]
            .trim_start_matches(|c: char| c == ':' || c == '-' || c.is_whitespace())
            .trim();
        if !remainder.is_empty() {
            return Some(remainder.to_string());
        }

        let next = texts[col + 1..]
            .iter()
            .map(|t| t.trim_start_matches(':').trim())
            .find(|t| !t.is_empty())?;
        if self.is_label(next) {
            return None;
        }
        Some(next.to_string())
    }

    fn is_label(&self, text: &str) -> bool {
        self.job_labels
            .iter()
            .chain(&self.customer_labels)
            .chain(&self.order_qty_labels)
            .any(|re| re.is_match(text))
    }
}

fn compile_labels(labels: &[String]) -> ImportResult<Vec<Regex>> {
    labels
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|label| {
            RegexBuilder::new(&regex::escape(label.trim()))
                .case_insensitive(true)
                .build()
                .map_err(|e| ImportError::InternalError(format!("元数据标签无效 ({}): {}", label, e)))
        })
        .collect()
}

/// "20+5" → 25，"1,000" → 1000；无数字返回 None
pub fn parse_order_qty(value: &str) -> Option<f64> {
    let matched = ORDER_QTY_PATTERN.find(value)?;
    let total: f64 = QTY_PARTS
        .find_iter(matched.as_str())
        .filter_map(|part| part.as_str().replace(',', "").parse::<f64>().ok())
        .sum();
    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> MetadataExtractor {
        MetadataExtractor::new(&MetadataLabels::default()).unwrap()
    }

    #[test]
    fn test_extract_inline_values() {
        let grid = CellGrid::from_text_rows(&[
            vec!["WORK ORDER"],
            vec!["JOB NO.: WO-2231"],
            vec!["Customer: Acme Industries Ltd"],
            vec!["Order Qty. 20+5 sets"],
            vec!["Material", "Units"],
        ]);

        let metadata = extractor().extract(&grid, 4);

        assert_eq!(metadata.job_number, Some("WO-2231".to_string()));
        assert_eq!(metadata.client_name, Some("Acme Industries Ltd".to_string()));
        assert_eq!(metadata.top_level_qty, 25.0);
    }

    #[test]
    fn test_extract_value_from_next_cell() {
        let grid = CellGrid::from_text_rows(&[
            vec!["Job No.", "", "J-77"],
            vec!["Customer:", "Beta Corp"],
        ]);

        let metadata = extractor().extract(&grid, 2);

        assert_eq!(metadata.job_number, Some("J-77".to_string()));
        assert_eq!(metadata.client_name, Some("Beta Corp".to_string()));
        assert_eq!(metadata.top_level_qty, 0.0);
    }

    #[test]
    fn test_last_match_wins() {
        let grid = CellGrid::from_text_rows(&[
            vec!["Job No. A-1"],
            vec!["Order Qty. 10"],
            vec!["Job No. B-2"],
            vec!["Order Qty. 12"],
        ]);

        let metadata = extractor().extract(&grid, 4);

        assert_eq!(metadata.job_number, Some("B-2".to_string()));
        assert_eq!(metadata.top_level_qty, 12.0);
    }

    #[test]
    fn test_absent_markers_default() {
        let grid = CellGrid::from_text_rows(&[vec!["Something else"], vec!["Order Qty. pending"]]);

        let metadata = extractor().extract(&grid, 10);

        assert_eq!(metadata, DocumentMetadata::default());
    }

    #[test]
    fn test_rows_beyond_limit_ignored() {
        let grid = CellGrid::from_text_rows(&[vec!["Material"], vec!["Job No. X-9"]]);
        let metadata = extractor().extract(&grid, 1);
        assert_eq!(metadata.job_number, None);
    }

    #[test]
    fn test_parse_order_qty() {
        assert_eq!(parse_order_qty("20+5"), Some(25.0));
        assert_eq!(parse_order_qty("qty 7 nos"), Some(7.0));
        assert_eq!(parse_order_qty("1 + 2 + 3"), Some(6.0));
        assert_eq!(parse_order_qty("none"), None);
    }

    #[test]
    fn test_parse_order_qty_separators_and_decimals() {
        assert_eq!(parse_order_qty("1,000"), Some(1000.0));
        assert_eq!(parse_order_qty("2.5"), Some(2.5));
        assert_eq!(parse_order_qty("1,200 + 300"), Some(1500.0));
        // 非千分位逗号: 只取逗号前的数字
        assert_eq!(parse_order_qty("10, urgent"), Some(10.0));
    }

    #[test]
    fn test_extract_order_qty_with_thousands_separator() {
        let grid = CellGrid::from_text_rows(&[vec!["Order Qty.", "1,000"]]);
        let metadata = extractor().extract(&grid, 1);
        assert_eq!(metadata.top_level_qty, 1000.0);
    }

    #[test]
    fn test_blank_value_does_not_capture_next_label() {
        let grid = CellGrid::from_text_rows(&[vec!["Job No.", "", "Customer:", "Acme"]]);

        let metadata = extractor().extract(&grid, 1);

        assert_eq!(metadata.job_number, None);
        assert_eq!(metadata.client_name, Some("Acme".to_string()));
    }

    #[test]
    fn test_blank_order_qty_before_job_label() {
        let grid = CellGrid::from_text_rows(&[vec!["Order Qty.", "Job No. J-5"]]);

        let metadata = extractor().extract(&grid, 1);

        assert_eq!(metadata.top_level_qty, 0.0);
        assert_eq!(metadata.job_number, Some("J-5".to_string()));
    }
}
