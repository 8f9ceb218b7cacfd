// ==========================================
// 商品目录后台 - 目录筛选与分面
// ==========================================
// 筛选: 关键字（name/sku/distributor 忽略大小写子串）
//       + 产品线 / 分销商 / 可售状态精确匹配 + 仅有货
// 分面: 各维度非空去重值（按首次出现顺序）
// ==========================================

use crate::domain::{Availability, ProductRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogFilter {
    pub search: Option<String>,
    pub product_line: Option<String>,
    pub distributor: Option<String>,
    pub availability: Option<Availability>,
    pub in_stock_only: bool,
}

impl CatalogFilter {
    /// 单条商品是否命中
    pub fn matches(&self, product: &ProductRecord) -> bool {
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            let hit = [&product.name, &product.sku, &product.distributor]
                .iter()
                .any(|field| field.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }

        if let Some(line) = &self.product_line {
            if &product.product_line != line {
                return false;
            }
        }

        if let Some(distributor) = &self.distributor {
            if &product.distributor != distributor {
                return false;
            }
        }

        if let Some(availability) = self.availability {
            if product.availability != availability {
                return false;
            }
        }

        !self.in_stock_only || product.in_stock
    }

    /// 筛选（保持输入顺序）
    pub fn apply<'a>(&self, products: &'a [ProductRecord]) -> Vec<&'a ProductRecord> {
        products.iter().filter(|p| self.matches(p)).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogFacets {
    pub product_lines: Vec<String>,
    pub distributors: Vec<String>,
    pub availabilities: Vec<Availability>,
}

impl CatalogFacets {
    pub fn collect(products: &[ProductRecord]) -> Self {
        let mut facets = Self::default();
        for product in products {
            push_distinct_text(&mut facets.product_lines, &product.product_line);
            push_distinct_text(&mut facets.distributors, &product.distributor);
            if !facets.availabilities.contains(&product.availability) {
                facets.availabilities.push(product.availability);
            }
        }
        facets
    }
}

fn push_distinct_text(values: &mut Vec<String>, value: &str) {
    if !value.is_empty() && !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}
