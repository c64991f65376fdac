// ==========================================
// 物料需求核对系统 - 报表写出
// ==========================================
// 支持: xlsx (umya-spreadsheet) / JSON (serde_json) / CSV 目录 (csv)
// ==========================================

use crate::domain::report::Report;
use crate::domain::types::CellValue;
use crate::report::composer::{ReportComposer, ReportSheet};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("写出文件失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("xlsx 生成失败: {0}")]
    Xlsx(String),

    #[error("CSV 写出失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON 序列化失败: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;

// ==========================================
// OutputFormat - 按输出路径推断
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Xlsx,
    Json,
    CsvDir,
}

impl OutputFormat {
    /// .xlsx → Xlsx，.json → Json，其他视为目录
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("xlsx") => OutputFormat::Xlsx,
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::CsvDir,
        }
    }
}

/// 按路径推断格式写出报表
pub fn write_report(report: &Report, path: &Path) -> ReportResult<()> {
    let composer = ReportComposer::new();
    match OutputFormat::from_path(path) {
        OutputFormat::Xlsx => write_xlsx(&composer.compose(report), path),
        OutputFormat::Json => write_json(report, path),
        OutputFormat::CsvDir => write_csv_dir(&composer.compose(report), path).map(|_| ()),
    }
}

/// 工作表 → xlsx 字节流（加粗行设置粗体）
pub fn xlsx_bytes(sheets: &[ReportSheet]) -> ReportResult<Vec<u8>> {
    let mut book = umya_spreadsheet::new_file_empty_worksheet();

    for sheet in sheets {
        let ws = book
            .new_sheet(&sheet.name)
            .map_err(|e| ReportError::Xlsx(format!("创建工作表 {} 失败: {}", sheet.name, e)))?;

        for (row_idx, row) in sheet.rows.iter().enumerate() {
            for (col_idx, value) in row.cells.iter().enumerate() {
                // umya 坐标为 (列, 行)，均从 1 开始
                let cell = ws.get_cell_mut(((col_idx + 1) as u32, (row_idx + 1) as u32));
                match value {
                    CellValue::Number(n) => {
                        cell.set_value_number(*n);
                    }
                    CellValue::Text(s) => {
                        cell.set_value(s.clone());
                    }
                    CellValue::Empty => {}
                }
                if row.bold {
                    cell.get_style_mut().get_font_mut().set_bold(true);
                }
            }
        }
    }

    let mut out = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(&book, &mut out)
        .map_err(|e| ReportError::Xlsx(e.to_string()))?;
    Ok(out.into_inner())
}

pub fn write_xlsx(sheets: &[ReportSheet], path: &Path) -> ReportResult<()> {
    let bytes = xlsx_bytes(sheets)?;
    fs::write(path, bytes)?;
    info!(path = %path.display(), sheets = sheets.len(), "xlsx 报表已写出");
    Ok(())
}

pub fn write_json(report: &Report, path: &Path) -> ReportResult<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    info!(path = %path.display(), "JSON 报表已写出");
    Ok(())
}

/// "Per Order Requirement" → "per_order_requirement.csv"
fn csv_file_name(sheet_name: &str) -> String {
    let stem: String = sheet_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase();
    format!("{}.csv", stem)
}

/// 每个工作表一个 CSV 文件
pub fn write_csv_dir(sheets: &[ReportSheet], dir: &Path) -> ReportResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        let path = dir.join(csv_file_name(&sheet.name));
        let mut writer = csv::WriterBuilder::new().flexible(true).from_path(&path)?;
        for row in &sheet.rows {
            if row.cells.is_empty() {
                writer.write_record([""])?;
            } else {
                writer.write_record(row.cells.iter().map(|c| c.to_string()))?;
            }
        }
        writer.flush()?;
        written.push(path);
    }

    info!(dir = %dir.display(), files = written.len(), "CSV 报表已写出");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::composer::ReportRow;
    use calamine::{open_workbook_auto, Data, Reader};
    use tempfile::TempDir;

    fn sheets() -> Vec<ReportSheet> {
        vec![
            ReportSheet {
                name: "OverallRequirement".to_string(),
                rows: vec![
                    ReportRow::bold(vec![CellValue::text("Sl. No."), CellValue::text("Specification")]),
                    ReportRow::plain(vec![CellValue::Number(1.0), CellValue::text("Copper Wire")]),
                    ReportRow::blank(),
                ],
            },
            ReportSheet {
                name: "Stock Comparison".to_string(),
                rows: vec![ReportRow::plain(vec![CellValue::text("N/A")])],
            },
        ]
    }

    #[test]
    fn test_output_format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("out.XLSX")), OutputFormat::Xlsx);
        assert_eq!(OutputFormat::from_path(Path::new("out.json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("out")), OutputFormat::CsvDir);
    }

    #[test]
    fn test_csv_file_name() {
        assert_eq!(csv_file_name("Per Order Requirement"), "per_order_requirement.csv");
    }

    #[test]
    fn test_write_csv_dir() {
        let dir = TempDir::new().unwrap();
        let written = write_csv_dir(&sheets(), dir.path()).unwrap();

        assert_eq!(written.len(), 2);
        let content = fs::read_to_string(dir.path().join("overallrequirement.csv")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Sl. No.,Specification");
        assert_eq!(lines[1], "1,Copper Wire");
    }

    #[test]
    fn test_write_xlsx_readable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.xlsx");
        write_xlsx(&sheets(), &path).unwrap();

        let mut workbook = open_workbook_auto(&path).unwrap();
        assert_eq!(
            workbook.sheet_names().to_vec(),
            vec!["OverallRequirement".to_string(), "Stock Comparison".to_string()]
        );

        let range = workbook.worksheet_range("OverallRequirement").unwrap();
        assert_eq!(range.get_value((1, 1)), Some(&Data::String("Copper Wire".to_string())));
        assert_eq!(range.get_value((1, 0)), Some(&Data::Float(1.0)));
    }
}
