// ==========================================
// 物料需求核对系统 - 数据质量校验器实现
// ==========================================
// 职责: 对合并后明细做行级检查，只记日志，不过滤
// 规则: 同一行触发多个条件时合并为一条日志
// 注意: 全零行剔除属于汇总阶段，与本校验相互独立
// ==========================================

use crate::domain::material::{LineItem, MergedLineItem};
use crate::domain::report::{DqLevel, ValidationEntry};
use crate::importer::document_importer_trait::DqValidator as DqValidatorTrait;
use std::fmt;

// ==========================================
// ValidationReason - 行级问题原因
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
    TotalQtyZero,
    UnitsMissing,
    QtyPerUnitZero,
    UnitCountZero,
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationReason::TotalQtyZero => write!(f, "total quantity is zero"),
            ValidationReason::UnitsMissing => write!(f, "units missing"),
            ValidationReason::QtyPerUnitZero => write!(f, "qty per unit is zero"),
            ValidationReason::UnitCountZero => write!(f, "no. of units is zero"),
        }
    }
}

pub struct DqValidator;

impl DqValidator {
    /// 单条记录触发的全部原因（固定顺序）
    pub fn reasons_for(item: &MergedLineItem) -> Vec<ValidationReason> {
        let mut reasons = Vec::new();
        if item.total_qty == 0.0 {
            reasons.push(ValidationReason::TotalQtyZero);
        }
        if item.units.trim().is_empty() {
            reasons.push(ValidationReason::UnitsMissing);
        }
        if item.qty_per_unit == 0.0 {
            reasons.push(ValidationReason::QtyPerUnitZero);
        }
        if item.unit_count == 0.0 {
            reasons.push(ValidationReason::UnitCountZero);
        }
        reasons
    }
}

fn describe(material: &str) -> &str {
    if material.trim().is_empty() {
        "<no material>"
    } else {
        material
    }
}

impl DqValidatorTrait for DqValidator {
    fn validate_coercions(
        &self,
        file_name: &str,
        sheet_name: &str,
        items: &[LineItem],
    ) -> Vec<ValidationEntry> {
        items
            .iter()
            .flat_map(|item| {
                item.coercions.iter().map(move |note| {
                    ValidationEntry::sheet(
                        DqLevel::Warning,
                        file_name,
                        sheet_name,
                        format!(
                            "{}: non-numeric value '{}' in {} defaulted to 0",
                            describe(&item.material),
                            note.raw,
                            note.field
                        ),
                    )
                    .with_row(item.row_number)
                })
            })
            .collect()
    }

    fn validate_items(
        &self,
        file_name: &str,
        sheet_name: &str,
        items: &[MergedLineItem],
    ) -> Vec<ValidationEntry> {
        let mut entries = Vec::new();

        for item in items {
            let reasons = Self::reasons_for(item);
            if reasons.is_empty() {
                continue;
            }

            let joined = reasons
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join("; ");

            entries.push(
                ValidationEntry::sheet(
                    DqLevel::Warning,
                    file_name,
                    sheet_name,
                    format!(
                        "Sl. No. {} ({}): {}",
                        item.group_key,
                        describe(&item.material),
                        joined
                    ),
                )
                .with_row(item.first_row),
            );
        }

        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::material::CoercionNote;
    use crate::domain::types::CanonicalField;

    fn merged(units: &str, qpu: f64, count: f64, total: f64) -> MergedLineItem {
        MergedLineItem {
            group_key: "3".to_string(),
            material: "Copper Wire".to_string(),
            units: units.to_string(),
            qty_per_unit: qpu,
            unit_count: count,
            total_qty: total,
            remarks: None,
            first_row: 12,
            source_rows: 1,
        }
    }

    #[test]
    fn test_clean_row_no_entry() {
        let entries = DqValidator.validate_items("a.xlsx", "S1", &[merged("KG", 5.0, 20.0, 100.0)]);
        assert!(entries.is_empty());
    }

    #[test]
    fn test_multiple_reasons_single_line() {
        let entries = DqValidator.validate_items("a.xlsx", "S1", &[merged("  ", 0.0, 4.0, 0.0)]);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].row_number, Some(12));
        assert_eq!(entries[0].file_name.as_deref(), Some("a.xlsx"));
        assert_eq!(entries[0].sheet_name.as_deref(), Some("S1"));
        assert_eq!(
            entries[0].message,
            "Sl. No. 3 (Copper Wire): total quantity is zero; units missing; qty per unit is zero"
        );
    }

    #[test]
    fn test_reasons_each_condition() {
        assert_eq!(
            DqValidator::reasons_for(&merged("KG", 1.0, 0.0, 5.0)),
            vec![ValidationReason::UnitCountZero]
        );
        assert_eq!(
            DqValidator::reasons_for(&merged("KG", 0.0, 0.0, 0.0)),
            vec![
                ValidationReason::TotalQtyZero,
                ValidationReason::QtyPerUnitZero,
                ValidationReason::UnitCountZero
            ]
        );
    }

    #[test]
    fn test_coercion_entries() {
        let item = LineItem {
            row_number: 8,
            group_key: Some("1".to_string()),
            material: "Pipe".to_string(),
            units: "MTR".to_string(),
            qty_per_unit: 0.0,
            unit_count: 2.0,
            total_qty: 0.0,
            remarks: None,
            coercions: vec![CoercionNote {
                field: CanonicalField::QtyPerUnit,
                raw: "two".to_string(),
            }],
        };

        let entries = DqValidator.validate_coercions("a.csv", "a", &[item]);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].row_number, Some(8));
        assert!(entries[0].message.contains("'two'"));
        assert!(entries[0].message.contains("Qty. per unit"));
    }
}
