// ==========================================
// 物料需求核对系统 - 领域模型层
// ==========================================
// 职责: 定义单元格网格、明细行、汇总记录、报表模型
// 红线: 不含文件读写逻辑,不含引擎逻辑
// ==========================================

pub mod aggregate;
pub mod grid;
pub mod material;
pub mod report;
pub mod types;

// 重导出核心类型
pub use aggregate::{
    AggregateRecord, AvailableStock, PerOrderRecord, StockComparisonRecord, StockDifference,
};
pub use grid::{CellGrid, SheetGrid, SourceDocument};
pub use material::{CoercionNote, DocumentMetadata, LineItem, MergedLineItem, SheetOutcome};
pub use report::{
    DqLevel, JobClient, Report, SheetStatus, SheetSummary, ValidationEntry,
};
pub use types::{CanonicalField, CellValue, CoercedNumber, NumberOrigin, StockStatus};
