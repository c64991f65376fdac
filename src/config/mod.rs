// ==========================================
// 物料需求核对系统 - 配置层
// ==========================================
// 职责: 管道配置加载、默认值与校验
// 存储: JSON 文件 + 环境变量覆写
// ==========================================

pub mod config_manager;
pub mod pipeline_config;

// 重导出核心配置类型
pub use config_manager::{ConfigError, ConfigManager};
pub use pipeline_config::{
    config_keys, ColumnRule, DuplicatePolicy, GroupingConfig, HeaderScanConfig, LedgerConfig,
    MetadataLabels, PipelineConfig,
};
