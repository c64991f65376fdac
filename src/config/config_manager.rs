// ==========================================
// 物料需求核对系统 - 配置管理器
// ==========================================
// 职责: 配置加载（JSON 文件 → 默认值兜底）、环境变量覆写、合法性校验
// ==========================================

use crate::config::pipeline_config::{config_keys, PipelineConfig};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    Read { path: String, message: String },

    #[error("配置文件解析失败 ({path}): {message}")]
    Parse { path: String, message: String },

    #[error("配置值不合法: {0}")]
    Invalid(String),
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager;

impl ConfigManager {
    /// 默认配置文件位置（<config_dir>/material-requirement/config.json）
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("material-requirement").join("config.json"))
    }

    /// 加载配置
    ///
    /// # 参数
    /// - path: 显式指定的配置文件；None 时尝试默认位置，不存在则使用默认配置
    pub fn load(path: Option<&Path>) -> Result<PipelineConfig, ConfigError> {
        let mut config = match path {
            Some(p) => Self::load_file(p)?,
            None => match Self::default_config_path() {
                Some(p) if p.exists() => Self::load_file(&p)?,
                _ => {
                    debug!("未找到配置文件，使用默认配置");
                    PipelineConfig::default()
                }
            },
        };

        Self::apply_env_overrides(&mut config);
        Self::validate(&config)?;
        Ok(config)
    }

    /// 从 JSON 文件读取配置
    pub fn load_file(path: &Path) -> Result<PipelineConfig, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = Self::parse(&raw).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        info!(path = %path.display(), "配置文件已加载");
        Ok(config)
    }

    pub fn parse(raw: &str) -> Result<PipelineConfig, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// 环境变量覆写（非法值忽略并告警）
    pub fn apply_env_overrides(config: &mut PipelineConfig) {
        if let Ok(v) = std::env::var(config_keys::HEADER_ROWS_ENV) {
            Self::apply_header_rows_override(config, &v);
        }
    }

    fn apply_header_rows_override(config: &mut PipelineConfig, value: &str) {
        match value.trim().parse::<usize>() {
            Ok(rows) => config.header_scan.max_rows = rows,
            Err(_) => warn!(
                key = config_keys::HEADER_ROWS_ENV,
                value = %value,
                "环境变量不是合法整数，已忽略"
            ),
        }
    }

    /// 校验配置
    pub fn validate(config: &PipelineConfig) -> Result<(), ConfigError> {
        if config.header_scan.max_rows == 0 {
            return Err(ConfigError::Invalid(
                "header_scan.max_rows 必须大于 0".to_string(),
            ));
        }

        if config.required_columns().next().is_none() {
            return Err(ConfigError::Invalid("至少需要一个必填列".to_string()));
        }

        for rule in &config.columns {
            if rule.aliases.iter().all(|a| a.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "列 {} 没有可用的别名",
                    rule.field
                )));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for rule in &config.columns {
            if !seen.insert(rule.field) {
                return Err(ConfigError::Invalid(format!("列 {} 重复定义", rule.field)));
            }
        }

        if config.ledger.name_column.trim().is_empty()
            || config.ledger.quantity_column.trim().is_empty()
        {
            return Err(ConfigError::Invalid("库存台账列名不能为空".to_string()));
        }

        if config.grouping.min_tag_len == 0 {
            return Err(ConfigError::Invalid(
                "grouping.min_tag_len 必须大于 0".to_string(),
            ));
        }

        Ok(())
    }
}
