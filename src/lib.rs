// ==========================================
// 物料需求核对系统 - 核心库
// ==========================================
// 系统定位: 工单表格规范化 → 物料需求汇总 → 库存核对
// 技术栈: calamine + csv 读取, umya-spreadsheet 写出, tokio 并发导入
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 导入层 - 外部表格
pub mod importer;

// 引擎层 - 汇总/核对/编排
pub mod engine;

// 报表层 - 组装与写出
pub mod report;

// 配置层 - 管道配置
pub mod config;

// 日志系统
pub mod logging;

// 性能统计
pub mod perf;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    AggregateRecord, CellGrid, CellValue, PerOrderRecord, Report, SourceDocument,
    StockComparisonRecord, StockStatus, ValidationEntry,
};

// 配置
pub use config::{ConfigManager, PipelineConfig};

// 导入
pub use importer::{DocumentImporter, DocumentImporterImpl, ImportError, ImportResult};

// 引擎
pub use engine::{Aggregator, ReportPipeline, StockReconciler};

// 报表
pub use report::{ReportComposer, ReportError};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "物料需求核对系统";
