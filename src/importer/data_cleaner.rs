// ==========================================
// 物料需求核对系统 - 数据清洗器实现
// ==========================================
// 职责: TRIM / UPPER / NULL 标准化 / 数值容错解析 / 名称归一化
// ==========================================

use crate::domain::types::{CellValue, CoercedNumber};
use crate::importer::document_importer_trait::DataCleaner as DataCleanerTrait;

pub struct DataCleaner;

// 千分位分隔符（含不换行空格、窄空格）
const THOUSANDS_SEPARATORS: [char; 4] = [',', '\'', '\u{00A0}', '\u{202F}'];

impl DataCleanerTrait for DataCleaner {
    fn clean_text(&self, value: &str, uppercase: bool) -> String {
        let trimmed = value.trim();
        if uppercase {
            trimmed.to_uppercase()
        } else {
            trimmed.to_string()
        }
    }

    fn normalize_null(&self, value: Option<String>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    fn coerce_number(&self, cell: &CellValue) -> CoercedNumber {
        match cell {
            CellValue::Empty => CoercedNumber::blank(),
            CellValue::Number(n) if n.is_finite() => CoercedNumber::parsed(*n),
            CellValue::Number(_) => CoercedNumber::defaulted(),
            CellValue::Text(s) => {
                if s.trim().is_empty() {
                    return CoercedNumber::blank();
                }
                match self.parse_locale_number(s) {
                    Some(n) => CoercedNumber::parsed(n),
                    None => CoercedNumber::defaulted(),
                }
            }
        }
    }
}

impl DataCleaner {
    /// 容错解析数值：去空白、去千分位后按浮点数解析
    pub fn parse_locale_number(&self, value: &str) -> Option<f64> {
        let cleaned: String = value
            .trim()
            .chars()
            .filter(|c| !THOUSANDS_SEPARATORS.contains(c) && !c.is_whitespace())
            .collect();

        if cleaned.is_empty() {
            return None;
        }

        cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
    }

    /// 名称归一化（库存匹配用）：TRIM + 合并连续空白 + 小写
    pub fn normalize_name(&self, value: &str) -> String {
        value
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::NumberOrigin;

    #[test]
    fn test_clean_text_basic() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.clean_text("  hello  ", false), "hello");
        assert_eq!(cleaner.clean_text("  hello  ", true), "HELLO");
    }

    #[test]
    fn test_normalize_null() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.normalize_null(Some("  ".to_string())), None);
        assert_eq!(cleaner.normalize_null(None), None);
        assert_eq!(
            cleaner.normalize_null(Some("  value  ".to_string())),
            Some("value".to_string())
        );
    }

    #[test]
    fn test_parse_locale_number_separators() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_locale_number("1,250.5"), Some(1250.5));
        assert_eq!(cleaner.parse_locale_number(" 12 "), Some(12.0));
        assert_eq!(cleaner.parse_locale_number("1\u{00A0}000"), Some(1000.0));
        assert_eq!(cleaner.parse_locale_number("abc"), None);
        assert_eq!(cleaner.parse_locale_number("NaN"), None);
    }

    #[test]
    fn test_coerce_number_distinguishes_zero_sources() {
        let cleaner = DataCleaner;

        let zero = cleaner.coerce_number(&CellValue::text("0"));
        assert_eq!(zero.value, 0.0);
        assert_eq!(zero.origin, NumberOrigin::Parsed);

        let blank = cleaner.coerce_number(&CellValue::Empty);
        assert_eq!(blank.value, 0.0);
        assert_eq!(blank.origin, NumberOrigin::Blank);

        let failed = cleaner.coerce_number(&CellValue::text("five"));
        assert_eq!(failed.value, 0.0);
        assert!(failed.is_defaulted());
    }

    #[test]
    fn test_coerce_number_native() {
        let cleaner = DataCleaner;
        let n = cleaner.coerce_number(&CellValue::Number(7.5));
        assert_eq!(n.value, 7.5);
        assert_eq!(n.origin, NumberOrigin::Parsed);
    }

    #[test]
    fn test_normalize_name() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.normalize_name("  Copper   Wire "), "copper wire");
    }
}
