// ==========================================
// 物料需求核对系统 - 报表层
// ==========================================
// 职责: 报表组装（纯转换）与写出（xlsx / JSON / CSV）
// ==========================================

pub mod composer;
pub mod writer;

pub use composer::{ReportComposer, ReportRow, ReportSheet};
pub use writer::{
    write_csv_dir, write_json, write_report, write_xlsx, xlsx_bytes, OutputFormat, ReportError,
    ReportResult,
};
