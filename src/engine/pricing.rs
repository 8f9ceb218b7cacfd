// ==========================================
// 商品目录后台 - 展示价格与库存状态
// ==========================================
// 职责: 促销价生效判定 / 展示价格 / 美元格式化 / 库存状态
// 规则: 促销价 > 0 且 (无截止日 或 截止日 >= 今天) 时生效
// ==========================================

use crate::domain::{Availability, ProductRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 促销价是否生效
pub fn has_active_override(product: &ProductRecord, today: NaiveDate) -> bool {
    match product.override_price {
        Some(price) if price > 0.0 => product
            .override_end_date
            .map_or(true, |end| end >= today),
        _ => false,
    }
}

/// 展示价格
///
/// 生效的促销价 → wholesale_price → 历史字段 price → 0
pub fn display_price(product: &ProductRecord, today: NaiveDate) -> f64 {
    if has_active_override(product, today) {
        if let Some(price) = product.override_price {
            return price;
        }
    }
    product.base_price()
}

/// 美元格式（`$1,234.56`，负数为 `-$1.00`）
pub fn format_usd(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0.00".to_string();
    }

    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = cents / 100;
    let remainder = cents % 100;

    let digits = dollars.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, remainder)
}

// ==========================================
// 库存状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    PreOrder,
    InStock,
    OutOfStock,
}

impl StockStatus {
    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::PreOrder => "Pre-Order",
            StockStatus::InStock => "In Stock",
            StockStatus::OutOfStock => "Out of Stock",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 库存状态（预订优先于库存标志）
pub fn stock_status(product: &ProductRecord) -> StockStatus {
    if product.availability == Availability::PreOrder {
        StockStatus::PreOrder
    } else if product.in_stock {
        StockStatus::InStock
    } else {
        StockStatus::OutOfStock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn product_with_override(end: Option<NaiveDate>) -> ProductRecord {
        let mut product = ProductRecord::new("A-1", "Widget");
        product.set_wholesale_price(20.0);
        product.override_price = Some(15.0);
        product.override_end_date = end;
        product
    }

    #[test]
    fn test_expired_override_uses_wholesale() {
        let product = product_with_override(Some(day(2024, 1, 31)));
        assert!(!has_active_override(&product, day(2024, 2, 1)));
        assert_eq!(display_price(&product, day(2024, 2, 1)), 20.0);
    }

    #[test]
    fn test_override_active_through_end_date() {
        let product = product_with_override(Some(day(2024, 1, 31)));
        assert_eq!(display_price(&product, day(2024, 1, 31)), 15.0);
        assert_eq!(display_price(&product_with_override(None), day(2030, 1, 1)), 15.0);
    }

    #[test]
    fn test_zero_override_is_ignored() {
        let mut product = product_with_override(None);
        product.override_price = Some(0.0);
        assert_eq!(display_price(&product, day(2024, 1, 1)), 20.0);
    }

    #[test]
    fn test_display_price_falls_back_to_legacy_price() {
        let mut product = ProductRecord::new("A-1", "Widget");
        product.wholesale_price = 0.0;
        product.price = 7.5;
        assert_eq!(display_price(&product, day(2024, 1, 1)), 7.5);
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(0.0), "$0.00");
        assert_eq!(format_usd(9.99), "$9.99");
        assert_eq!(format_usd(12.5), "$12.50");
        assert_eq!(format_usd(1234.56), "$1,234.56");
        assert_eq!(format_usd(1234567.891), "$1,234,567.89");
        assert_eq!(format_usd(-1.0), "-$1.00");
    }

    #[test]
    fn test_stock_status() {
        let mut product = ProductRecord::new("A-1", "Widget");
        assert_eq!(stock_status(&product), StockStatus::OutOfStock);
        product.in_stock = true;
        assert_eq!(stock_status(&product), StockStatus::InStock);
        product.availability = Availability::PreOrder;
        assert_eq!(stock_status(&product), StockStatus::PreOrder);
    }
}
