// ==========================================
// 物料需求核对系统 - 文件解析器实现
// ==========================================
// 职责: 原始字节流 → 每个工作表一个 CellGrid
// 支持: Excel (.xlsx/.xlsm/.xls/.xlsb/.ods) / CSV (.csv)
// ==========================================

use crate::domain::grid::{CellGrid, SheetGrid, SourceDocument};
use crate::domain::types::CellValue;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::document_importer_trait::FileParser;
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use csv::ReaderBuilder;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

// ==========================================
// CSV Parser 实现
// ==========================================
// CSV 只有一个工作表，以文件名（去扩展名）命名
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_document(&self, document: &SourceDocument) -> ImportResult<Vec<SheetGrid>> {
        let ext = document.extension();
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        // 表头位置不固定，不把首行当表头
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(document.bytes.as_slice());

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row: Vec<CellValue> = record
                .iter()
                .map(|value| {
                    if value.trim().is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::text(value)
                    }
                })
                .collect();
            rows.push(row);
        }

        debug!(file = %document.file_name, rows = rows.len(), "CSV 解析完成");

        Ok(vec![SheetGrid {
            name: document.file_stem(),
            grid: CellGrid::new(rows),
        }])
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_document(&self, document: &SourceDocument) -> ImportResult<Vec<SheetGrid>> {
        let ext = document.extension();
        if !matches!(ext.as_str(), "xlsx" | "xlsm" | "xls" | "xlsb" | "ods") {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let cursor = Cursor::new(document.bytes.clone());
        let mut workbook = open_workbook_auto_from_rs(cursor)?;

        let sheet_names = workbook.sheet_names();
        if sheet_names.is_empty() {
            return Err(ImportError::ExcelParseError(
                "Excel 文件无工作表".to_string(),
            ));
        }

        let mut sheets = Vec::with_capacity(sheet_names.len());
        for name in sheet_names {
            // 单个工作表读取失败不影响其他表
            let range = match workbook.worksheet_range(&name) {
                Ok(range) => range,
                Err(e) => {
                    warn!(file = %document.file_name, sheet = %name, error = %e, "工作表读取失败，已跳过");
                    continue;
                }
            };

            sheets.push(SheetGrid {
                grid: range_to_grid(&range),
                name,
            });
        }

        debug!(file = %document.file_name, sheets = sheets.len(), "Excel 解析完成");
        Ok(sheets)
    }
}

/// calamine Range → CellGrid
///
/// Range 会裁掉前导空行/空列，这里按 start() 补齐，
/// 使网格索引与工作表物理位置一致
fn range_to_grid(range: &Range<Data>) -> CellGrid {
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); row_offset];
    for data_row in range.rows() {
        let mut row = vec![CellValue::Empty; col_offset];
        row.extend(data_row.iter().map(data_to_cell));
        rows.push(row);
    }
    CellGrid::new(rows)
}

/// calamine 单元格 → CellValue
fn data_to_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => {
            if s.trim().is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s.clone())
            }
        }
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_document(&self, document: &SourceDocument) -> ImportResult<Vec<SheetGrid>> {
        match document.extension().as_str() {
            "csv" => CsvParser.parse_document(document),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => ExcelParser.parse_document(document),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl UniversalFileParser {
    /// 从文件路径读取（IO 外壳使用）
    pub fn read_document<P: AsRef<Path>>(file_path: P) -> ImportResult<SourceDocument> {
        let path = file_path.as_ref();

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(SourceDocument::new(file_name, bytes))
    }
}
