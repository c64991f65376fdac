// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 构造工单 / 台账测试文档（CSV 文本、多工作表 xlsx 字节流、临时文件）
// ==========================================

#![allow(dead_code)]

use material_requirement::domain::{CellValue, SourceDocument};
use material_requirement::report::{xlsx_bytes, ReportRow, ReportSheet};
use std::path::PathBuf;
use tempfile::TempDir;

/// 明细行: (序号, 物料, 单位, 每单位数量, 单位数)
pub type Line<'a> = (&'a str, &'a str, &'a str, f64, f64);

pub const HEADER: [&str; 5] = ["Sl. No.", "Material", "Units", "Qty. per unit", "No. of units"];

/// 生成带抬头元数据的工单 CSV 文本
pub fn work_order_csv(job: &str, client: &str, order_qty: &str, lines: &[Line]) -> String {
    let mut out = String::new();
    out.push_str("WORK ORDER,,,,\n");
    out.push_str(&format!("Job No. {},,,,\n", job));
    out.push_str(&format!("Customer:,{},,,\n", client));
    out.push_str(&format!("Order Qty. {},,,,\n", order_qty));
    out.push_str(&HEADER.join(","));
    out.push('\n');
    for (key, material, units, qpu, count) in lines {
        out.push_str(&format!("{},{},{},{},{}\n", key, material, units, qpu, count));
    }
    out
}

pub fn csv_document(file_name: &str, content: &str) -> SourceDocument {
    SourceDocument::new(file_name, content.as_bytes().to_vec())
}

/// 单元格构造：空串 → Empty，可解析为数字 → Number，其余 → Text
pub fn cell(value: &str) -> CellValue {
    if value.is_empty() {
        CellValue::Empty
    } else if let Ok(n) = value.parse::<f64>() {
        CellValue::Number(n)
    } else {
        CellValue::text(value)
    }
}

pub fn sheet(name: &str, rows: &[&[&str]]) -> ReportSheet {
    ReportSheet {
        name: name.to_string(),
        rows: rows
            .iter()
            .map(|r| ReportRow::plain(r.iter().map(|v| cell(v)).collect()))
            .collect(),
    }
}

/// 多工作表 xlsx 文档
pub fn xlsx_document(file_name: &str, sheets: &[ReportSheet]) -> SourceDocument {
    let bytes = xlsx_bytes(sheets).expect("Failed to build xlsx fixture");
    SourceDocument::new(file_name, bytes)
}

/// 库存台账 CSV
pub fn ledger_document(entries: &[(&str, f64)]) -> SourceDocument {
    let mut out = String::from("Stock Summary,\nMaterial Name,Stock Quantity\n");
    for (name, qty) in entries {
        out.push_str(&format!("{},{}\n", name, qty));
    }
    csv_document("ledger.csv", &out)
}

/// 写入临时目录，返回文件路径
pub fn write_temp_document(dir: &TempDir, document: &SourceDocument) -> PathBuf {
    let path = dir.path().join(&document.file_name);
    std::fs::write(&path, &document.bytes).expect("Failed to write temp document");
    path
}
