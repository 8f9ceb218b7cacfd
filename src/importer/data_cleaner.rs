// ==========================================
// 商品目录后台 - 数据清洗器实现
// ==========================================
// 职责: NULL 标准化 / 日期标准化 / 价格与布尔解析
// 原则: 格式错误只回落默认值，不中断导入
// ==========================================

use crate::importer::product_importer_trait::DataCleaner as DataCleanerTrait;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// 空日期占位符
const DATE_PLACEHOLDER: &str = "---";

pub struct DataCleaner;

impl DataCleanerTrait for DataCleaner {
    fn normalize_null(&self, value: &str) -> Option<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    fn normalize_date(&self, value: &str) -> Option<NaiveDate> {
        let value = value.trim();
        if value.is_empty() || value == DATE_PLACEHOLDER {
            return None;
        }

        if ISO_DATE_RE.is_match(value) {
            return NaiveDate::parse_from_str(value, "%Y-%m-%d").ok();
        }

        if value.contains('/') {
            return parse_us_date(value);
        }

        None
    }

    fn parse_price(&self, value: &str) -> f64 {
        self.parse_optional_price(value).unwrap_or(0.0)
    }

    fn parse_optional_price(&self, value: &str) -> Option<f64> {
        value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
    }

    fn parse_flag(&self, value: &str, accept_numeric: bool) -> bool {
        let value = value.trim();
        value.eq_ignore_ascii_case("true") || (accept_numeric && value == "1")
    }
}

impl DataCleaner {
    /// 日期标准化（文本形式，输出零填充的 YYYY-MM-DD）
    pub fn normalize_date_str(&self, value: &str) -> Option<String> {
        self.normalize_date(value)
            .map(|d| d.format("%Y-%m-%d").to_string())
    }
}

/// 解析 `MM/DD/YYYY`（月/日允许 1 位，年份必须 4 位）
fn parse_us_date(value: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = value.split('/').map(str::trim).collect();
    let [month, day, year] = parts.as_slice() else {
        return None;
    };
    if year.len() != 4 {
        return None;
    }

    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    let year: i32 = year.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_date_cases() {
        let cleaner = DataCleaner;
        assert_eq!(
            cleaner.normalize_date_str("3/5/2024"),
            Some("2024-03-05".to_string())
        );
        assert_eq!(
            cleaner.normalize_date_str("12/31/2024"),
            Some("2024-12-31".to_string())
        );
        assert_eq!(
            cleaner.normalize_date_str("2024-03-05"),
            Some("2024-03-05".to_string())
        );
        assert_eq!(cleaner.normalize_date_str("---"), None);
        assert_eq!(cleaner.normalize_date_str(""), None);
        assert_eq!(cleaner.normalize_date_str("March 5"), None);
    }

    #[test]
    fn test_normalize_date_invalid_calendar_dates() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.normalize_date("2024-02-30"), None);
        assert_eq!(cleaner.normalize_date("13/01/2024"), None);
        assert_eq!(cleaner.normalize_date("3/5/24"), None);
    }

    #[test]
    fn test_parse_price_defaults() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_price("12.5"), 12.5);
        assert_eq!(cleaner.parse_price(""), 0.0);
        assert_eq!(cleaner.parse_price("abc"), 0.0);
        assert_eq!(cleaner.parse_price("-3"), 0.0);
        assert_eq!(cleaner.parse_optional_price(" "), None);
        assert_eq!(cleaner.parse_optional_price("9.99"), Some(9.99));
    }

    #[test]
    fn test_parse_flag() {
        let cleaner = DataCleaner;
        assert!(cleaner.parse_flag("TRUE", true));
        assert!(cleaner.parse_flag("1", true));
        assert!(!cleaner.parse_flag("1", false));
        assert!(cleaner.parse_flag("True", false));
        assert!(!cleaner.parse_flag("yes", true));
    }
}
