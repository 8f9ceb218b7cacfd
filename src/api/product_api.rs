// ==========================================
// 商品API
// ==========================================
// 职责: 商品列表 / 软删除 / 目录浏览（筛选 + 分面 + 展示价）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::ProductRecord;
use crate::engine::{
    display_price, has_active_override, is_requestable, stock_status, CatalogFacets,
    CatalogFilter, StockStatus,
};
use crate::repository::{ProductFilter, ProductStore};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// 目录条目（商品 + 展示字段）
#[derive(Debug, Clone, Serialize)]
pub struct CatalogItem {
    pub product: ProductRecord,
    pub display_price: f64,
    pub on_sale: bool,
    pub stock_status: StockStatus,
    pub requestable: bool,
}

/// 目录页
#[derive(Debug, Clone, Serialize)]
pub struct CatalogPage {
    pub items: Vec<CatalogItem>,
    pub facets: CatalogFacets,
    pub total: usize, // 筛选前的启用商品数
}

pub struct ProductApi {
    store: Arc<dyn ProductStore>,
}

impl ProductApi {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    /// 商品列表
    pub async fn list_products(&self, active_only: bool) -> ApiResult<Vec<ProductRecord>> {
        Ok(self
            .store
            .list_products(ProductFilter { active_only })
            .await?)
    }

    /// 软删除商品
    pub async fn delete_product(&self, id: &str) -> ApiResult<()> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ApiError::InvalidInput("商品 ID 不能为空".to_string()));
        }
        self.store.delete_product(id).await?;
        info!(product_id = %id, "商品已停用");
        Ok(())
    }

    /// 目录浏览（分面基于全部启用商品，条目基于筛选结果）
    pub async fn browse(&self, filter: &CatalogFilter, today: NaiveDate) -> ApiResult<CatalogPage> {
        let products = self.store.list_products(ProductFilter::active()).await?;
        let facets = CatalogFacets::collect(&products);

        let items = filter
            .apply(&products)
            .into_iter()
            .map(|product| CatalogItem {
                display_price: display_price(product, today),
                on_sale: has_active_override(product, today),
                stock_status: stock_status(product),
                requestable: is_requestable(product, today),
                product: product.clone(),
            })
            .collect();

        Ok(CatalogPage {
            items,
            facets,
            total: products.len(),
        })
    }
}
