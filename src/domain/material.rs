// ==========================================
// 物料需求核对系统 - 明细行领域模型
// ==========================================
// 用途: 规范化 → 合并 → 校验 各阶段的值对象
// 生命周期: 每个阶段完整产出后交给下一阶段，无共享可变状态
// ==========================================

use crate::domain::types::CanonicalField;
use serde::{Deserialize, Serialize};

// ==========================================
// DocumentMetadata - 工作表抬头元数据
// ==========================================
// 每个工作表提取一次；缺失为合法状态
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub job_number: Option<String>,
    pub client_name: Option<String>,
    pub top_level_qty: f64,
}

// ==========================================
// CoercionNote - 数值转换兜底记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoercionNote {
    pub field: CanonicalField,
    pub raw: String,
}

// ==========================================
// LineItem - 规范化后的明细行
// ==========================================
// group_key 为原始序号；续行无序号时为 None，由合并阶段前向填充
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub row_number: usize, // 原表物理行号（1 起）
    pub group_key: Option<String>,
    pub material: String,
    pub units: String,
    pub qty_per_unit: f64,
    pub unit_count: f64,
    pub total_qty: f64,
    pub remarks: Option<String>,
    pub coercions: Vec<CoercionNote>,
}

// ==========================================
// MergedLineItem - 按 group_key 合并后的明细
// ==========================================
// 数量字段为组内求和；物料/单位取组内首行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedLineItem {
    pub group_key: String,
    pub material: String,
    pub units: String,
    pub qty_per_unit: f64,
    pub unit_count: f64,
    pub total_qty: f64,
    pub remarks: Option<String>,
    pub first_row: usize,
    pub source_rows: usize,
}

impl MergedLineItem {
    pub fn is_all_zero(&self) -> bool {
        self.qty_per_unit == 0.0 && self.unit_count == 0.0 && self.total_qty == 0.0
    }

    pub fn has_material(&self) -> bool {
        !self.material.trim().is_empty()
    }
}

// ==========================================
// SheetOutcome - 单个工作表的处理结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetOutcome {
    pub file_name: String,
    pub sheet_name: String,
    pub metadata: DocumentMetadata,
    pub job_number: String, // 元数据缺失时为文件名派生值
    pub order_id: String,   // job_number + "_" + sheet_name
    pub header_row: usize,
    pub rows_read: usize,
    pub items: Vec<MergedLineItem>,
}

impl SheetOutcome {
    pub fn unique_order_id(job_number: &str, sheet_name: &str) -> String {
        format!("{}_{}", job_number, sheet_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_order_id() {
        assert_eq!(SheetOutcome::unique_order_id("J-7", "Sheet1"), "J-7_Sheet1");
    }

    #[test]
    fn test_all_zero_detection() {
        let item = MergedLineItem {
            group_key: "1".to_string(),
            material: "Bolt".to_string(),
            units: "NOS".to_string(),
            qty_per_unit: 0.0,
            unit_count: 0.0,
            total_qty: 0.0,
            remarks: None,
            first_row: 5,
            source_rows: 1,
        };
        assert!(item.is_all_zero());
        assert!(item.has_material());
    }
}
