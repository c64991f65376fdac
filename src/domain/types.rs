// ==========================================
// 物料需求核对系统 - 领域类型定义
// ==========================================
// 职责: 单元格值 / 数值转换来源 / 标准字段 / 库存状态
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 单元格值 (Cell Value)
// ==========================================
// 读取后不可变，行列索引与原表物理位置一致
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    pub fn text<S: Into<String>>(value: S) -> Self {
        CellValue::Text(value.into())
    }

    /// 是否为空（空单元格或纯空白文本）
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// 转为去除首尾空白的文本；整数值不带 ".0"
    pub fn as_trimmed_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) => format_number(*n),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) => write!(f, "{}", format_number(*n)),
        }
    }
}

/// 数值格式化（整数去掉小数部分）
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

// ==========================================
// 数值来源 (Number Origin)
// ==========================================
// 区分"确实为 0"与"解析失败按 0 处理"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NumberOrigin {
    Parsed,    // 正常解析
    Blank,     // 空单元格，取 0
    Defaulted, // 无法解析，取 0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoercedNumber {
    pub value: f64,
    pub origin: NumberOrigin,
}

impl CoercedNumber {
    pub fn parsed(value: f64) -> Self {
        Self {
            value,
            origin: NumberOrigin::Parsed,
        }
    }

    pub fn blank() -> Self {
        Self {
            value: 0.0,
            origin: NumberOrigin::Blank,
        }
    }

    pub fn defaulted() -> Self {
        Self {
            value: 0.0,
            origin: NumberOrigin::Defaulted,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        self.origin == NumberOrigin::Defaulted
    }
}

// ==========================================
// 标准字段 (Canonical Field)
// ==========================================
// 所有已识别的表头布局都映射到这组字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    GroupKey,
    Material,
    Units,
    QtyPerUnit,
    UnitCount,
    TotalQty,
    Remarks,
}

impl CanonicalField {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            CanonicalField::QtyPerUnit | CanonicalField::UnitCount | CanonicalField::TotalQty
        )
    }

    /// 报表/日志中使用的列名
    pub fn label(&self) -> &'static str {
        match self {
            CanonicalField::GroupKey => "Sl. No.",
            CanonicalField::Material => "Material",
            CanonicalField::Units => "Units",
            CanonicalField::QtyPerUnit => "Qty. per unit",
            CanonicalField::UnitCount => "No. of units",
            CanonicalField::TotalQty => "Total qty",
            CanonicalField::Remarks => "Remarks",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ==========================================
// 库存核对状态 (Stock Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockStatus {
    ExactMatch,
    Surplus,
    Shortage,
    NotFound,
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockStatus::ExactMatch => write!(f, "Exact Match"),
            StockStatus::Surplus => write!(f, "Surplus"),
            StockStatus::Shortage => write!(f, "Shortage"),
            StockStatus::NotFound => write!(f, "Not Found"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_blank() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::text("   ").is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
        assert!(!CellValue::text("KG").is_blank());
    }

    #[test]
    fn test_cell_value_trimmed_text() {
        assert_eq!(CellValue::Number(3.0).as_trimmed_text(), "3");
        assert_eq!(CellValue::Number(2.5).as_trimmed_text(), "2.5");
        assert_eq!(CellValue::text("  Copper  ").as_trimmed_text(), "Copper");
    }

    #[test]
    fn test_stock_status_display() {
        assert_eq!(StockStatus::ExactMatch.to_string(), "Exact Match");
        assert_eq!(StockStatus::NotFound.to_string(), "Not Found");
    }
}
