// ==========================================
// 物料需求核对系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 结构性错误为工作表级，可恢复：跳过该表并记日志
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xlsm/.xls/.xlsb/.ods/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 结构性错误（工作表级）=====
    #[error("未找到表头 (工作表 {sheet}，扫描前 {scanned} 行)")]
    HeaderNotFound { sheet: String, scanned: usize },

    #[error("缺少必填列 (工作表 {sheet}): {columns}")]
    MissingColumns { sheet: String, columns: String },

    // ===== 库存台账错误 =====
    #[error("库存台账缺少列: {0}")]
    LedgerColumnMissing(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_sheet() {
        let err = ImportError::HeaderNotFound {
            sheet: "Sheet1".to_string(),
            scanned: 20,
        };
        assert!(err.to_string().contains("Sheet1"));
        assert!(err.to_string().contains("20"));

        let err: ImportError = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert!(matches!(err, ImportError::FileReadError(_)));
    }
}
