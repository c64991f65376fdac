// ==========================================
// 物料需求核对系统 - 报表与校验日志模型
// ==========================================

use crate::domain::aggregate::{AggregateRecord, PerOrderRecord, StockComparisonRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

// ==========================================
// DqLevel - 日志级别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DqLevel {
    Error,   // 工作表/文档被跳过
    Warning, // 行级问题，行保留
}

impl fmt::Display for DqLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DqLevel::Error => write!(f, "ERROR"),
            DqLevel::Warning => write!(f, "WARNING"),
        }
    }
}

// ==========================================
// ValidationEntry - 校验日志条目
// ==========================================
// 一条条目对应一行可读诊断信息
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationEntry {
    pub level: DqLevel,
    pub file_name: Option<String>,
    pub sheet_name: Option<String>,
    pub row_number: Option<usize>,
    pub message: String,
}

impl ValidationEntry {
    pub fn pipeline(level: DqLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            file_name: None,
            sheet_name: None,
            row_number: None,
            message: message.into(),
        }
    }

    pub fn file(level: DqLevel, file_name: &str, message: impl Into<String>) -> Self {
        Self {
            level,
            file_name: Some(file_name.to_string()),
            sheet_name: None,
            row_number: None,
            message: message.into(),
        }
    }

    pub fn sheet(
        level: DqLevel,
        file_name: &str,
        sheet_name: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level,
            file_name: Some(file_name.to_string()),
            sheet_name: Some(sheet_name.to_string()),
            row_number: None,
            message: message.into(),
        }
    }

    pub fn with_row(mut self, row_number: usize) -> Self {
        self.row_number = Some(row_number);
        self
    }
}

impl fmt::Display for ValidationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.level)?;
        match (&self.file_name, &self.sheet_name) {
            (Some(file), Some(sheet)) => write!(f, " {} / {}", file, sheet)?,
            (Some(file), None) => write!(f, " {}", file)?,
            _ => {}
        }
        if let Some(row) = self.row_number {
            write!(f, " (row {})", row)?;
        }
        write!(f, ": {}", self.message)
    }
}

// ==========================================
// SheetSummary - 工作表处理摘要
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SheetStatus {
    Processed,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetSummary {
    pub file_name: String,
    pub sheet_name: String,
    pub status: SheetStatus,
    pub reason: Option<String>,
    pub rows_read: usize,
    pub groups: usize,
}

// ==========================================
// JobClient - 作业号 → 客户名索引
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobClient {
    pub job_number: String,
    pub client_name: String,
}

// ==========================================
// Report - 最终结构化报表
// ==========================================
// run_id / generated_at 为仅有的随机/时钟字段，幂等比较时忽略
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub overall: Vec<AggregateRecord>,
    pub per_order: Vec<PerOrderRecord>,
    pub stock_comparison: Vec<StockComparisonRecord>,
    pub total_top_level_qty: f64,
    pub job_index: Vec<JobClient>,
    pub sheet_summaries: Vec<SheetSummary>,
    pub validation_log: Vec<ValidationEntry>,
}

impl Report {
    /// 校验日志的可读行
    pub fn log_lines(&self) -> Vec<String> {
        self.validation_log.iter().map(|e| e.to_string()).collect()
    }

    pub fn processed_sheets(&self) -> usize {
        self.sheet_summaries
            .iter()
            .filter(|s| s.status == SheetStatus::Processed)
            .count()
    }
}
