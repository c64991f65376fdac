// ==========================================
// 物料需求核对系统 - 汇总与库存核对模型
// ==========================================

use crate::domain::types::{format_number, StockStatus};
use serde::{Serialize, Serializer};
use std::fmt;

// ==========================================
// AggregateRecord - 总需求（跨全部文档）
// ==========================================
// 键: (specification, units)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRecord {
    pub specification: String,
    pub units: String,
    pub total_qty: f64,
    pub group_tag: String,
}

// ==========================================
// PerOrderRecord - 分订单需求
// ==========================================
// 键: (order_id, specification, units)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerOrderRecord {
    pub order_id: String,
    pub specification: String,
    pub units: String,
    pub total_qty: f64,
}

// ==========================================
// 可用库存（未找到时为哨兵值）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AvailableStock {
    Quantity(f64),
    NotFound,
}

impl fmt::Display for AvailableStock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvailableStock::Quantity(q) => write!(f, "{}", format_number(*q)),
            AvailableStock::NotFound => write!(f, "not found"),
        }
    }
}

impl Serialize for AvailableStock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AvailableStock::Quantity(q) => serializer.serialize_f64(*q),
            AvailableStock::NotFound => serializer.serialize_str("not found"),
        }
    }
}

// ==========================================
// 库存差额（未找到时为 N/A，调用方需先判断状态）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StockDifference {
    Quantity(f64),
    NotApplicable,
}

impl StockDifference {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StockDifference::Quantity(q) => Some(*q),
            StockDifference::NotApplicable => None,
        }
    }
}

impl fmt::Display for StockDifference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockDifference::Quantity(q) => write!(f, "{}", format_number(*q)),
            StockDifference::NotApplicable => write!(f, "N/A"),
        }
    }
}

impl Serialize for StockDifference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StockDifference::Quantity(q) => serializer.serialize_f64(*q),
            StockDifference::NotApplicable => serializer.serialize_str("N/A"),
        }
    }
}

// ==========================================
// StockComparisonRecord - 库存核对结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockComparisonRecord {
    pub specification: String,
    pub units: String,
    pub required_qty: f64,
    pub available_stock: AvailableStock,
    pub stock_difference: StockDifference,
    pub status: StockStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_serialization() {
        let json = serde_json::to_string(&AvailableStock::NotFound).unwrap();
        assert_eq!(json, "\"not found\"");
        let json = serde_json::to_string(&StockDifference::NotApplicable).unwrap();
        assert_eq!(json, "\"N/A\"");
        let json = serde_json::to_string(&StockDifference::Quantity(-40.0)).unwrap();
        assert_eq!(json, "-40.0");
    }
}
