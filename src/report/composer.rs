// ==========================================
// 物料需求核对系统 - 报表组装器
// ==========================================
// 职责: Report → 有序工作表（带类型单元格 + 加粗标记）
// 工作表: OverallRequirement / Per Order Requirement / Stock Comparison / Validation Log
// ==========================================

use crate::domain::aggregate::{AvailableStock, StockDifference};
use crate::domain::report::Report;
use crate::domain::types::CellValue;
use serde::Serialize;

pub const OVERALL_SHEET: &str = "OverallRequirement";
pub const PER_ORDER_SHEET: &str = "Per Order Requirement";
pub const STOCK_SHEET: &str = "Stock Comparison";
pub const LOG_SHEET: &str = "Validation Log";

pub const TOTAL_ORDER_QTY_LABEL: &str = "Total Order Qty";

// ==========================================
// ReportRow / ReportSheet - 输出网格
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub cells: Vec<CellValue>,
    pub bold: bool,
}

impl ReportRow {
    pub fn plain(cells: Vec<CellValue>) -> Self {
        Self { cells, bold: false }
    }

    pub fn bold(cells: Vec<CellValue>) -> Self {
        Self { cells, bold: true }
    }

    pub fn blank() -> Self {
        Self::plain(Vec::new())
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.is_blank())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSheet {
    pub name: String,
    pub rows: Vec<ReportRow>,
}

fn text(value: &str) -> CellValue {
    CellValue::text(value)
}

fn headers(labels: &[&str]) -> ReportRow {
    ReportRow::bold(labels.iter().map(|l| text(l)).collect())
}

fn sequence(n: usize) -> CellValue {
    CellValue::Number(n as f64)
}

// ==========================================
// ReportComposer - 报表组装器
// ==========================================
#[derive(Debug, Default)]
pub struct ReportComposer;

impl ReportComposer {
    pub fn new() -> Self {
        Self
    }

    /// 全部工作表（固定顺序）
    pub fn compose(&self, report: &Report) -> Vec<ReportSheet> {
        vec![
            self.overall_sheet(report),
            self.per_order_sheet(report),
            self.stock_sheet(report),
            self.log_sheet(report),
        ]
    }

    /// 总需求：按分组标签分节，每节序号从 1 开始，节标题行加粗；
    /// 其后为订单数量合计与作业号/客户名索引
    pub fn overall_sheet(&self, report: &Report) -> ReportSheet {
        let mut rows = vec![headers(&["Sl. No.", "Specification", "Units", "Total Qty"])];

        let mut current_tag: Option<&str> = None;
        let mut sl_no = 0;
        for record in &report.overall {
            if current_tag != Some(record.group_tag.as_str()) {
                current_tag = Some(record.group_tag.as_str());
                sl_no = 0;
                rows.push(ReportRow::bold(vec![
                    CellValue::Empty,
                    text(&record.group_tag.to_uppercase()),
                ]));
            }
            sl_no += 1;
            rows.push(ReportRow::plain(vec![
                sequence(sl_no),
                text(&record.specification),
                text(&record.units),
                CellValue::Number(record.total_qty),
            ]));
        }

        rows.push(ReportRow::blank());
        rows.push(ReportRow::bold(vec![
            CellValue::Empty,
            text(TOTAL_ORDER_QTY_LABEL),
            CellValue::Empty,
            CellValue::Number(report.total_top_level_qty),
        ]));
        rows.push(ReportRow::blank());

        rows.push(headers(&["Job No.", "Client Name"]));
        for entry in &report.job_index {
            rows.push(ReportRow::plain(vec![
                text(&entry.job_number),
                text(&entry.client_name),
            ]));
        }

        ReportSheet {
            name: OVERALL_SHEET.to_string(),
            rows,
        }
    }

    pub fn per_order_sheet(&self, report: &Report) -> ReportSheet {
        let mut rows = vec![headers(&[
            "Sl. No.",
            "Order ID",
            "Specification",
            "Units",
            "Total Qty",
        ])];

        rows.extend(report.per_order.iter().enumerate().map(|(i, record)| {
            ReportRow::plain(vec![
                sequence(i + 1),
                text(&record.order_id),
                text(&record.specification),
                text(&record.units),
                CellValue::Number(record.total_qty),
            ])
        }));

        ReportSheet {
            name: PER_ORDER_SHEET.to_string(),
            rows,
        }
    }

    pub fn stock_sheet(&self, report: &Report) -> ReportSheet {
        let mut rows = vec![headers(&[
            "Specification",
            "Units",
            "Required Qty",
            "Available Stock",
            "Stock Difference",
            "Status",
        ])];

        rows.extend(report.stock_comparison.iter().map(|record| {
            let available = match record.available_stock {
                AvailableStock::Quantity(q) => CellValue::Number(q),
                AvailableStock::NotFound => text(&record.available_stock.to_string()),
            };
            let difference = match record.stock_difference {
                StockDifference::Quantity(q) => CellValue::Number(q),
                StockDifference::NotApplicable => text(&record.stock_difference.to_string()),
            };
            ReportRow::plain(vec![
                text(&record.specification),
                text(&record.units),
                CellValue::Number(record.required_qty),
                available,
                difference,
                text(&record.status.to_string()),
            ])
        }));

        ReportSheet {
            name: STOCK_SHEET.to_string(),
            rows,
        }
    }

    pub fn log_sheet(&self, report: &Report) -> ReportSheet {
        let mut rows = vec![headers(&["Level", "File", "Sheet", "Row", "Message"])];

        rows.extend(report.validation_log.iter().map(|entry| {
            ReportRow::plain(vec![
                text(&entry.level.to_string()),
                entry.file_name.as_deref().map(text).unwrap_or(CellValue::Empty),
                entry.sheet_name.as_deref().map(text).unwrap_or(CellValue::Empty),
                entry
                    .row_number
                    .map(|r| CellValue::Number(r as f64))
                    .unwrap_or(CellValue::Empty),
                text(&entry.message),
            ])
        }));

        ReportSheet {
            name: LOG_SHEET.to_string(),
            rows,
        }
    }
}
