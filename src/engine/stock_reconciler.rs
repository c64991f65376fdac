// ==========================================
// 物料需求核对系统 - 库存核对引擎
// ==========================================
// 职责: 总需求 vs 库存台账，逐物料给出差额与状态
// 规则: 名称匹配 = TRIM + 合并空白 + 小写
//       差额 = 可用 - 需求；=0 Exact Match / >0 Surplus / <0 Shortage
//       台账无此物料 → Not Found，差额为 N/A
// ==========================================

use crate::domain::aggregate::{
    AggregateRecord, AvailableStock, StockComparisonRecord, StockDifference,
};
use crate::domain::types::StockStatus;
use crate::importer::ledger_loader::InventoryLedger;
use tracing::{info, instrument};

/// 差额绝对值小于该值视为相等（浮点求和误差）
pub const EXACT_MATCH_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Default)]
pub struct StockReconciler;

impl StockReconciler {
    pub fn new() -> Self {
        Self
    }

    /// 按可用量与需求量判定差额与状态
    pub fn classify(required: f64, available: f64) -> (StockDifference, StockStatus) {
        let difference = available - required;
        if difference.abs() < EXACT_MATCH_TOLERANCE {
            (StockDifference::Quantity(0.0), StockStatus::ExactMatch)
        } else if difference > 0.0 {
            (StockDifference::Quantity(difference), StockStatus::Surplus)
        } else {
            (StockDifference::Quantity(difference), StockStatus::Shortage)
        }
    }

    pub fn reconcile_one(
        &self,
        record: &AggregateRecord,
        ledger: &InventoryLedger,
    ) -> StockComparisonRecord {
        let (available_stock, stock_difference, status) =
            match ledger.lookup(&record.specification) {
                Some(available) => {
                    let (difference, status) = Self::classify(record.total_qty, available);
                    (AvailableStock::Quantity(available), difference, status)
                }
                None => (
                    AvailableStock::NotFound,
                    StockDifference::NotApplicable,
                    StockStatus::NotFound,
                ),
            };

        StockComparisonRecord {
            specification: record.specification.clone(),
            units: record.units.clone(),
            required_qty: record.total_qty,
            available_stock,
            stock_difference,
            status,
        }
    }

    /// 逐条核对，输出顺序与总需求视图一致
    #[instrument(skip(self, overall, ledger), fields(records = overall.len(), ledger = ledger.len()))]
    pub fn reconcile(
        &self,
        overall: &[AggregateRecord],
        ledger: &InventoryLedger,
    ) -> Vec<StockComparisonRecord> {
        let records: Vec<StockComparisonRecord> = overall
            .iter()
            .map(|record| self.reconcile_one(record, ledger))
            .collect();

        let shortages = records
            .iter()
            .filter(|r| r.status == StockStatus::Shortage)
            .count();
        let not_found = records
            .iter()
            .filter(|r| r.status == StockStatus::NotFound)
            .count();
        info!(records = records.len(), shortages, not_found, "库存核对完成");

        records
    }
}
