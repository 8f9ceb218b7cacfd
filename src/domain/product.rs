// ==========================================
// 商品目录后台 - 商品领域模型
// ==========================================
// 职责: 导入/导出/存储之间交换的商品记录
// 红线: sku / name 为空的记录不得落库
// 红线: wholesale_price 与历史字段 price 必须保持一致
// ==========================================

use crate::domain::types::Availability;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// ProductRecord - 商品记录
// ==========================================
// 对齐: products 表
// 生命周期: 导入 upsert(按 sku) / 软删除(is_active=false)，不做物理删除
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductRecord {
    // ===== 标识 =====
    pub id: Option<String>, // 存储层分配的 ID（落库前为空）
    pub sku: String,        // 业务唯一键
    pub name: String,

    // ===== 分类信息 =====
    pub distributor: String,
    pub product_line: String, // 产品线（与 category 混用）
    pub category: String,     // 派生: 默认取 product_line
    pub description: Option<String>,

    // ===== 价格 =====
    pub wholesale_price: f64,
    pub price: f64, // 历史兼容字段，恒等于 wholesale_price
    pub cost: Option<f64>,
    pub override_price: Option<f64>, // 促销价（未过期时优先展示）
    pub override_end_date: Option<NaiveDate>,

    // ===== 日期 =====
    pub release_date: Option<NaiveDate>,
    pub orders_due_date: Option<NaiveDate>, // 预订截止日

    // ===== 库存与可售 =====
    pub availability: Availability,
    pub in_stock: bool,
    pub stock_quantity: i32, // 派生: in_stock ? 1 : 0

    // ===== 链接 =====
    pub image_url: Option<String>,
    pub product_url: Option<String>,

    // ===== 标志位 =====
    pub approved: bool,  // 是否允许提交请购
    pub is_sample: bool,
    pub is_active: bool, // 软删除标志
}

impl ProductRecord {
    /// 创建只含必填字段的记录（其余取默认值）
    pub fn new(sku: impl Into<String>, name: impl Into<String>) -> Self {
        let mut record = Self {
            sku: sku.into(),
            name: name.into(),
            ..Self::default()
        };
        record.apply_derived_defaults();
        record
    }

    /// 设置批发价（同步历史字段 price）
    pub fn set_wholesale_price(&mut self, value: f64) {
        self.wholesale_price = value;
        self.price = value;
    }

    /// 导入后派生默认值
    ///
    /// - category 为空时取 product_line
    /// - stock_quantity = in_stock ? 1 : 0
    /// - is_active = true
    /// - price 与 wholesale_price 对齐
    pub fn apply_derived_defaults(&mut self) {
        if self.category.trim().is_empty() {
            self.category = self.product_line.clone();
        }
        self.stock_quantity = if self.in_stock { 1 } else { 0 };
        self.is_active = true;
        self.price = self.wholesale_price;
    }

    /// 必填字段是否齐全（sku / name 去空白后非空）
    pub fn has_required_fields(&self) -> bool {
        !self.sku.trim().is_empty() && !self.name.trim().is_empty()
    }

    /// 导出/展示使用的基础价格
    ///
    /// wholesale_price 为 0 时回落到历史字段 price
    pub fn base_price(&self) -> f64 {
        if self.wholesale_price != 0.0 {
            self.wholesale_price
        } else {
            self.price
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_applies_defaults() {
        let record = ProductRecord::new("SKU-1", "Widget");
        assert!(record.is_active);
        assert_eq!(record.availability, Availability::Open);
        assert_eq!(record.stock_quantity, 0);
    }

    #[test]
    fn test_derived_defaults_keep_distinct_category() {
        let mut record = ProductRecord::new("SKU-1", "Widget");
        record.product_line = "Tools".to_string();
        record.category = "Hardware".to_string();
        record.in_stock = true;
        record.apply_derived_defaults();

        assert_eq!(record.category, "Hardware");
        assert_eq!(record.stock_quantity, 1);
    }

    #[test]
    fn test_derived_defaults_category_from_product_line() {
        let mut record = ProductRecord::new("SKU-1", "Widget");
        record.product_line = "Tools".to_string();
        record.category.clear();
        record.apply_derived_defaults();
        assert_eq!(record.category, "Tools");
    }

    #[test]
    fn test_required_fields() {
        assert!(ProductRecord::new("SKU-1", "Widget").has_required_fields());
        assert!(!ProductRecord::new("  ", "Widget").has_required_fields());
        assert!(!ProductRecord::new("SKU-1", "").has_required_fields());
    }

    #[test]
    fn test_price_mirrors_wholesale() {
        let mut record = ProductRecord::new("SKU-1", "Widget");
        record.set_wholesale_price(12.5);
        assert_eq!(record.price, 12.5);
        assert_eq!(record.base_price(), 12.5);
    }
}
