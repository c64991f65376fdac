// ==========================================
// 物料需求核对系统 - 引擎层
// ==========================================
// 职责: 汇总、库存核对与管道编排,不读写文件
// 红线: 各阶段为纯转换,完整产出后再交给下一阶段
// ==========================================

pub mod aggregator;
pub mod orchestrator;
pub mod stock_reconciler;

// 重导出核心引擎
pub use aggregator::{AggregationResult, Aggregator};
pub use orchestrator::ReportPipeline;
pub use stock_reconciler::{StockReconciler, EXACT_MATCH_TOLERANCE};
