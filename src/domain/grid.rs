// ==========================================
// 物料需求核对系统 - 表格网格模型
// ==========================================
// 用途: 文件解析层输出，后续各阶段只读
// ==========================================

use crate::domain::types::CellValue;
use serde::{Deserialize, Serialize};

// ==========================================
// CellGrid - 单个工作表的单元格网格
// ==========================================
// 行为有序行序列，每行为有序单元格序列，无固定 schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellGrid {
    rows: Vec<Vec<CellValue>>,
}

impl CellGrid {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// 由文本行构造（测试与 CSV 解析使用）
    pub fn from_text_rows<S: AsRef<str>>(rows: &[Vec<S>]) -> Self {
        let rows = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| {
                        let text = cell.as_ref();
                        if text.is_empty() {
                            CellValue::Empty
                        } else {
                            CellValue::text(text)
                        }
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&[CellValue]> {
        self.rows.get(index).map(|r| r.as_slice())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    /// 越界返回 Empty
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(EMPTY)
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }
}

// ==========================================
// SheetGrid - 带名称的工作表
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetGrid {
    pub name: String,
    pub grid: CellGrid,
}

// ==========================================
// SourceDocument - 外部 IO 层交入的原始文档
// ==========================================
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new<S: Into<String>>(file_name: S, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// 文件名去扩展名（作业号缺失时的兜底值）
    pub fn file_stem(&self) -> String {
        std::path::Path::new(&self.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.file_name)
            .to_string()
    }

    pub fn extension(&self) -> String {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase()
    }
}
