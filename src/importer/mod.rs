// ==========================================
// 物料需求核对系统 - 导入层
// ==========================================
// 职责: 外部表格 → 标准化明细行 / 库存台账
// 支持: Excel (xlsx/xls/xlsm/ods), CSV
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod document_importer_impl;
pub mod document_importer_trait;
pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod header_locator;
pub mod ledger_loader;
pub mod line_item_merger;
pub mod metadata_extractor;

// 重导出核心类型
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use document_importer_impl::{DocumentImporterImpl, DocumentOutcome};
pub use dq_validator::DqValidator as DqValidatorImpl;
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper as FieldMapperImpl;
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use header_locator::{ExpectedColumn, HeaderLocator, HeaderMatch};
pub use ledger_loader::{InventoryLedger, LedgerEntry, LedgerLoader};
pub use line_item_merger::{assign_group_keys, merge_line_items};
pub use metadata_extractor::MetadataExtractor;

// 重导出 Trait 接口
pub use document_importer_trait::{
    DataCleaner, DocumentImporter, DqValidator, FieldMapper, FileParser,
};
