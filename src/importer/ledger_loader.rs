// ==========================================
// 物料需求核对系统 - 库存台账加载器
// ==========================================
// 职责: 读取库存台账（物料名列 + 数量列），建立归一化名称索引
// 规则: 名称匹配 = TRIM + 合并空白 + 小写；重名按配置策略处理
// ==========================================

use crate::config::{DuplicatePolicy, HeaderScanConfig, LedgerConfig};
use crate::domain::grid::{CellGrid, SourceDocument};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::document_importer_trait::{DataCleaner as _, FileParser};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::header_locator::{ExpectedColumn, HeaderLocator};
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub name: String,
    pub quantity: f64,
    pub row_number: usize,
}

// ==========================================
// InventoryLedger - 库存台账
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct InventoryLedger {
    entries: Vec<LedgerEntry>,
    index: HashMap<String, f64>,
    duplicates: Vec<String>,
}

impl InventoryLedger {
    pub fn empty() -> Self {
        Self::default()
    }

    /// 由有序条目建立索引
    pub fn from_entries(entries: Vec<LedgerEntry>, policy: DuplicatePolicy) -> Self {
        let cleaner = DataCleaner;
        let mut index: HashMap<String, f64> = HashMap::new();
        let mut duplicates = Vec::new();

        for entry in &entries {
            match index.entry(cleaner.normalize_name(&entry.name)) {
                Entry::Vacant(slot) => {
                    slot.insert(entry.quantity);
                }
                Entry::Occupied(mut slot) => {
                    if !duplicates.contains(slot.key()) {
                        duplicates.push(slot.key().clone());
                    }
                    match policy {
                        DuplicatePolicy::First => {}
                        DuplicatePolicy::Last => *slot.get_mut() = entry.quantity,
                        DuplicatePolicy::Sum => *slot.get_mut() += entry.quantity,
                    }
                }
            }
        }

        Self {
            entries,
            index,
            duplicates,
        }
    }

    /// 按归一化名称查找可用数量
    pub fn lookup(&self, material: &str) -> Option<f64> {
        self.index.get(&DataCleaner.normalize_name(material)).copied()
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// 出现多次的归一化名称（按首次重复顺序）
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ==========================================
// LedgerLoader - 台账加载器
// ==========================================
pub struct LedgerLoader {
    locator: HeaderLocator,
    name_column: ExpectedColumn,
    quantity_column: ExpectedColumn,
    column_names: String,
    policy: DuplicatePolicy,
    cleaner: DataCleaner,
}

impl LedgerLoader {
    pub fn new(ledger: &LedgerConfig, header_scan: &HeaderScanConfig) -> Self {
        Self {
            locator: HeaderLocator::from_config(header_scan),
            name_column: ExpectedColumn::single(&ledger.name_column),
            quantity_column: ExpectedColumn::single(&ledger.quantity_column),
            column_names: format!("{}, {}", ledger.name_column, ledger.quantity_column),
            policy: ledger.duplicate_policy,
            cleaner: DataCleaner,
        }
    }

    /// 从文档加载：取第一个能定位到表头的工作表
    pub fn load(&self, document: &SourceDocument) -> ImportResult<InventoryLedger> {
        let sheets = UniversalFileParser.parse_document(document)?;

        for sheet in &sheets {
            if let Some(ledger) = self.from_grid(&sheet.grid) {
                info!(
                    file = %document.file_name,
                    sheet = %sheet.name,
                    entries = ledger.len(),
                    duplicates = ledger.duplicates().len(),
                    "库存台账加载完成"
                );
                for name in ledger.duplicates() {
                    warn!(material = %name, policy = ?self.policy, "库存台账存在重名物料");
                }
                return Ok(ledger);
            }
        }

        Err(ImportError::LedgerColumnMissing(self.column_names.clone()))
    }

    /// 从网格读取；未定位到表头返回 None
    pub fn from_grid(&self, grid: &CellGrid) -> Option<InventoryLedger> {
        let expected = [self.name_column.clone(), self.quantity_column.clone()];
        let header = self.locator.locate(grid, &expected)?;
        let name_idx = self.name_column.find_in(&header.labels)?;
        let qty_idx = self.quantity_column.find_in(&header.labels)?;

        let mut entries = Vec::new();
        for row_index in header.data_start()..grid.row_count() {
            let name = self
                .cleaner
                .clean_text(&grid.cell(row_index, name_idx).as_trimmed_text(), false);
            if name.is_empty() {
                continue;
            }

            let quantity = self.cleaner.coerce_number(grid.cell(row_index, qty_idx));
            if quantity.is_defaulted() {
                warn!(row = row_index + 1, material = %name, "库存数量无法解析，按 0 处理");
            }

            entries.push(LedgerEntry {
                name,
                quantity: quantity.value,
                row_number: row_index + 1,
            });
        }

        Some(InventoryLedger::from_entries(entries, self.policy))
    }
}
