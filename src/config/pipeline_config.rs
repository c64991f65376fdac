// ==========================================
// 物料需求核对系统 - 管道配置
// ==========================================
// 职责: 表头扫描窗口 / 列名映射表 / 元数据标签 / 库存表列名 / 分组标签
// 存储: JSON 文件（缺省字段取默认值）
// ==========================================

use crate::domain::types::CanonicalField;
use serde::{Deserialize, Serialize};

// ==========================================
// 配置键（环境变量覆写）
// ==========================================
pub mod config_keys {
    /// 表头扫描行数
    pub const HEADER_ROWS_ENV: &str = "MATERIAL_REQUIREMENT_HEADER_ROWS";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub header_scan: HeaderScanConfig,
    pub columns: Vec<ColumnRule>,
    pub metadata: MetadataLabels,
    pub ledger: LedgerConfig,
    pub grouping: GroupingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            header_scan: HeaderScanConfig::default(),
            columns: default_column_rules(),
            metadata: MetadataLabels::default(),
            ledger: LedgerConfig::default(),
            grouping: GroupingConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// 表头定位所需的列（必填列）
    pub fn required_columns(&self) -> impl Iterator<Item = &ColumnRule> {
        self.columns.iter().filter(|c| c.required)
    }
}

// ==========================================
// 表头扫描
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderScanConfig {
    pub max_rows: usize,              // 只扫描前 N 行
    pub allow_two_row_headers: bool,  // 允许表头跨两行
}

impl Default for HeaderScanConfig {
    fn default() -> Self {
        Self {
            max_rows: 20,
            allow_two_row_headers: true,
        }
    }
}

// ==========================================
// 列名映射规则
// ==========================================
// 有序表：按声明顺序匹配，先命中者生效
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRule {
    pub field: CanonicalField,
    #[serde(default)]
    pub required: bool,
    pub aliases: Vec<String>,
}

impl ColumnRule {
    pub fn new(field: CanonicalField, required: bool, aliases: &[&str]) -> Self {
        Self {
            field,
            required,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
}

pub fn default_column_rules() -> Vec<ColumnRule> {
    vec![
        ColumnRule::new(
            CanonicalField::GroupKey,
            false,
            &["Sl. No.", "Sl.No.", "Sl No", "S. No.", "S.No.", "Sr. No.", "Sr.No."],
        ),
        ColumnRule::new(
            CanonicalField::Material,
            true,
            &["Material", "Materials", "Material Description", "Description"],
        ),
        ColumnRule::new(
            CanonicalField::Units,
            true,
            &["Units", "Unit", "UOM", "Specifications", "Specification"],
        ),
        ColumnRule::new(
            CanonicalField::QtyPerUnit,
            true,
            &["Qty. per unit", "Qty per unit", "QTY/ UNIT", "QTY/UNIT", "Qty./Unit"],
        ),
        ColumnRule::new(
            CanonicalField::UnitCount,
            true,
            &["No. of units", "No of units", "No. of Unit", "Unit count", "Nos."],
        ),
        ColumnRule::new(
            CanonicalField::TotalQty,
            false,
            &["Total qty", "Total qty.", "Total quantity", "Total_Qty", "Total"],
        ),
        ColumnRule::new(CanonicalField::Remarks, false, &["Remarks", "Remark"]),
    ]
}

// ==========================================
// 元数据标签（大小写不敏感、子串匹配）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataLabels {
    pub job_number: Vec<String>,
    pub customer: Vec<String>,
    pub order_qty: Vec<String>,
}

impl Default for MetadataLabels {
    fn default() -> Self {
        Self {
            job_number: vec!["job no.".to_string()],
            customer: vec!["customer:".to_string(), "customer".to_string()],
            order_qty: vec!["order qty.".to_string()],
        }
    }
}

// ==========================================
// 库存台账
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    First,
    Last,
    Sum,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub name_column: String,
    pub quantity_column: String,
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            name_column: "Material Name".to_string(),
            quantity_column: "Stock Quantity".to_string(),
            duplicate_policy: DuplicatePolicy::First,
        }
    }
}

// ==========================================
// 分组标签
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    pub fallback_tag: String,
    pub min_tag_len: usize,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            fallback_tag: "others".to_string(),
            min_tag_len: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_required_columns() {
        let config = PipelineConfig::default();
        let required: Vec<CanonicalField> = config.required_columns().map(|c| c.field).collect();
        assert_eq!(
            required,
            vec![
                CanonicalField::Material,
                CanonicalField::Units,
                CanonicalField::QtyPerUnit,
                CanonicalField::UnitCount
            ]
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "header_scan": { "max_rows": 5 }, "ledger": { "duplicate_policy": "sum" } }"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.header_scan.max_rows, 5);
        assert!(config.header_scan.allow_two_row_headers);
        assert_eq!(config.ledger.duplicate_policy, DuplicatePolicy::Sum);
        assert_eq!(config.ledger.name_column, "Material Name");
        assert_eq!(config.columns.len(), 7);
    }
}
