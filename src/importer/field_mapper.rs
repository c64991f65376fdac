// ==========================================
// 物料需求核对系统 - 字段映射器（表结构规范化）
// ==========================================
// 职责: 原始列名 → 标准字段映射 + 数值容错转换 + 丢弃无关列
// 规则: 有序映射表逐条匹配，已被占用的列不再参与后续匹配
// ==========================================

use crate::config::ColumnRule;
use crate::domain::grid::CellGrid;
use crate::domain::material::{CoercionNote, LineItem};
use crate::domain::types::{CanonicalField, CellValue, CoercedNumber};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::document_importer_trait::{DataCleaner as _, FieldMapper as FieldMapperTrait};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::header_locator::{ExpectedColumn, HeaderMatch};
use std::collections::HashMap;
use tracing::debug;

// ==========================================
// ColumnMapping - 标准字段 → 列索引
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMapping {
    columns: HashMap<CanonicalField, usize>,
}

impl ColumnMapping {
    pub fn index_of(&self, field: CanonicalField) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

pub struct FieldMapper {
    rules: Vec<(ColumnRule, ExpectedColumn)>,
    cleaner: DataCleaner,
}

impl FieldMapper {
    pub fn new(rules: &[ColumnRule]) -> Self {
        Self {
            rules: rules
                .iter()
                .map(|r| (r.clone(), ExpectedColumn::from_rule(r)))
                .collect(),
            cleaner: DataCleaner,
        }
    }

    /// 按映射表解析列位置；必填列缺失返回 MissingColumns
    pub fn resolve_columns(
        &self,
        sheet_name: &str,
        header: &HeaderMatch,
    ) -> ImportResult<ColumnMapping> {
        let mut mapping = ColumnMapping::default();
        let mut claimed = vec![false; header.labels.len()];
        let mut missing = Vec::new();

        for (rule, expected) in &self.rules {
            let found = (0..header.labels.len())
                .find(|&idx| !claimed[idx] && expected.matches(&header.labels[idx]));

            match found {
                Some(idx) => {
                    claimed[idx] = true;
                    mapping.columns.insert(rule.field, idx);
                }
                None if rule.required => missing.push(rule.field.label()),
                None => {}
            }
        }

        if !missing.is_empty() {
            return Err(ImportError::MissingColumns {
                sheet: sheet_name.to_string(),
                columns: missing.join(", "),
            });
        }

        debug!(sheet = sheet_name, mapped = mapping.len(), "列映射完成");
        Ok(mapping)
    }

    fn text_at(&self, row: &[CellValue], idx: Option<usize>) -> String {
        idx.and_then(|i| row.get(i))
            .map(|c| self.cleaner.clean_text(&c.as_trimmed_text(), false))
            .unwrap_or_default()
    }

    fn number_at(
        &self,
        row: &[CellValue],
        idx: Option<usize>,
        field: CanonicalField,
        coercions: &mut Vec<CoercionNote>,
    ) -> CoercedNumber {
        let cell = idx.and_then(|i| row.get(i)).unwrap_or(&CellValue::Empty);
        let number = self.cleaner.coerce_number(cell);
        if number.is_defaulted() {
            coercions.push(CoercionNote {
                field,
                raw: cell.as_trimmed_text(),
            });
        }
        number
    }

    fn map_row(&self, row: &[CellValue], row_number: usize, mapping: &ColumnMapping) -> LineItem {
        let mut coercions = Vec::new();

        let group_key = self
            .cleaner
            .normalize_null(Some(self.text_at(row, mapping.index_of(CanonicalField::GroupKey))));
        let material = self.text_at(row, mapping.index_of(CanonicalField::Material));
        let units = self.text_at(row, mapping.index_of(CanonicalField::Units));
        let remarks = self
            .cleaner
            .normalize_null(Some(self.text_at(row, mapping.index_of(CanonicalField::Remarks))));

        let qty_per_unit = self.number_at(
            row,
            mapping.index_of(CanonicalField::QtyPerUnit),
            CanonicalField::QtyPerUnit,
            &mut coercions,
        );
        let unit_count = self.number_at(
            row,
            mapping.index_of(CanonicalField::UnitCount),
            CanonicalField::UnitCount,
            &mut coercions,
        );

        // 总数列缺失或为空时按 每单位数量 × 单位数 计算；显式值（含 0）原样使用
        let total_idx = mapping.index_of(CanonicalField::TotalQty);
        let total_blank = total_idx
            .and_then(|i| row.get(i))
            .map(|c| c.is_blank())
            .unwrap_or(true);
        let total_qty = if total_blank {
            qty_per_unit.value * unit_count.value
        } else {
            self.number_at(row, total_idx, CanonicalField::TotalQty, &mut coercions)
                .value
        };

        LineItem {
            row_number,
            group_key,
            material,
            units,
            qty_per_unit: qty_per_unit.value,
            unit_count: unit_count.value,
            total_qty,
            remarks,
            coercions,
        }
    }
}

impl FieldMapperTrait for FieldMapper {
    fn map_sheet(
        &self,
        sheet_name: &str,
        grid: &CellGrid,
        header: &HeaderMatch,
    ) -> ImportResult<Vec<LineItem>> {
        let mapping = self.resolve_columns(sheet_name, header)?;

        let mut items = Vec::new();
        for row_index in header.data_start()..grid.row_count() {
            let Some(row) = grid.row(row_index) else {
                continue;
            };

            // 跳过完全空白的行
            if row.iter().all(|c| c.is_blank()) {
                continue;
            }

            items.push(self.map_row(row, row_index + 1, &mapping));
        }

        debug!(sheet = sheet_name, rows = items.len(), "字段映射完成");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::pipeline_config::default_column_rules;
    use crate::importer::header_locator::HeaderLocator;

    fn header_for(grid: &CellGrid) -> HeaderMatch {
        let expected: Vec<ExpectedColumn> = default_column_rules()
            .iter()
            .filter(|r| r.required)
            .map(ExpectedColumn::from_rule)
            .collect();
        HeaderLocator::new(20, true).locate(grid, &expected).unwrap()
    }

    #[test]
    fn test_map_sheet_basic() {
        let grid = CellGrid::from_text_rows(&[
            vec!["Job No. 1"],
            vec!["Sl. No.", "Material", "Units", "Qty. per unit", "No. of units", "Colour"],
            vec!["1", " Copper Wire ", "KG", "5", "20", "red"],
            vec!["", "", "", "", "", ""],
            vec!["2", "Bolt", "NOS", "1,000", "2", ""],
        ]);
        let header = header_for(&grid);

        let items = FieldMapper::new(&default_column_rules())
            .map_sheet("Sheet1", &grid, &header)
            .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].group_key, Some("1".to_string()));
        assert_eq!(items[0].material, "Copper Wire");
        assert_eq!(items[0].total_qty, 100.0);
        assert_eq!(items[0].row_number, 3);
        assert_eq!(items[1].qty_per_unit, 1000.0);
        assert_eq!(items[1].total_qty, 2000.0);
    }

    #[test]
    fn test_variant_labels() {
        let grid = CellGrid::from_text_rows(&[
            vec!["Material", "Specifications", "QTY/ UNIT", "No. of units"],
            vec!["Pipe", "MTR", "2", "3"],
        ]);
        let header = header_for(&grid);

        let items = FieldMapper::new(&default_column_rules())
            .map_sheet("S", &grid, &header)
            .unwrap();

        assert_eq!(items[0].units, "MTR");
        assert_eq!(items[0].qty_per_unit, 2.0);
        assert_eq!(items[0].group_key, None);
    }

    #[test]
    fn test_missing_required_column() {
        let header = HeaderMatch {
            row_index: 0,
            span: 1,
            labels: vec!["MATERIAL".to_string(), "UNITS".to_string()],
        };

        let result = FieldMapper::new(&default_column_rules()).resolve_columns("Sheet9", &header);

        match result {
            Err(ImportError::MissingColumns { sheet, columns }) => {
                assert_eq!(sheet, "Sheet9");
                assert!(columns.contains("Qty. per unit"));
                assert!(columns.contains("No. of units"));
            }
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_unparsable_number_defaults_to_zero_with_flag() {
        let grid = CellGrid::from_text_rows(&[
            vec!["Material", "Units", "Qty. per unit", "No. of units", "Total qty"],
            vec!["Pipe", "MTR", "two", "3", ""],
            vec!["Tape", "ROLL", "0", "3", "0"],
        ]);
        let header = header_for(&grid);

        let items = FieldMapper::new(&default_column_rules())
            .map_sheet("S", &grid, &header)
            .unwrap();

        assert_eq!(items[0].qty_per_unit, 0.0);
        assert_eq!(items[0].total_qty, 0.0);
        assert_eq!(items[0].coercions.len(), 1);
        assert_eq!(items[0].coercions[0].field, CanonicalField::QtyPerUnit);
        assert_eq!(items[0].coercions[0].raw, "two");

        // 合法的 0 不产生标记
        assert_eq!(items[1].qty_per_unit, 0.0);
        assert!(items[1].coercions.is_empty());
    }

    #[test]
    fn test_explicit_total_used_verbatim() {
        let grid = CellGrid::from_text_rows(&[
            vec!["Material", "Units", "Qty. per unit", "No. of units", "Total qty"],
            vec!["Pipe", "MTR", "2", "3", "7"],
        ]);
        let header = header_for(&grid);

        let items = FieldMapper::new(&default_column_rules())
            .map_sheet("S", &grid, &header)
            .unwrap();

        assert_eq!(items[0].total_qty, 7.0);
    }
}
