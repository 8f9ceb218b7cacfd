// ==========================================
// 请购API
// ==========================================
// 职责: 按 sku 定位商品后执行合并/新建，查询请购单
// 并发: 所有调用共享同一个 ProductLockRegistry
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::InterchangeConfigReader;
use crate::domain::{ProductRecord, RequestRecord, Requester};
use crate::engine::{ProductLockRegistry, Reconciliation, RequestOptions, RequestReconciler};
use crate::repository::{ProductFilter, ProductStore, RequestFilter, RequestStore};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

pub struct RequestApi {
    product_store: Arc<dyn ProductStore>,
    request_store: Arc<dyn RequestStore>,
    config: Arc<dyn InterchangeConfigReader>,
    locks: Arc<ProductLockRegistry>,
}

impl RequestApi {
    pub fn new(
        product_store: Arc<dyn ProductStore>,
        request_store: Arc<dyn RequestStore>,
        config: Arc<dyn InterchangeConfigReader>,
    ) -> Self {
        Self {
            product_store,
            request_store,
            config,
            locks: Arc::new(ProductLockRegistry::new()),
        }
    }

    async fn reconciler(&self) -> ApiResult<RequestReconciler<Arc<dyn RequestStore>>> {
        let max_attempts = self.config.get_max_merge_attempts().await?;
        Ok(RequestReconciler::with_locks(
            self.request_store.clone(),
            self.locks.clone(),
            max_attempts,
        ))
    }

    /// 对已加载的商品提交请购
    pub async fn request_product(
        &self,
        product: &ProductRecord,
        quantity: i64,
        requester: &Requester,
        options: &RequestOptions,
        today: NaiveDate,
    ) -> ApiResult<Reconciliation> {
        let reconciler = self.reconciler().await?;
        Ok(reconciler
            .request_product(product, quantity, requester, options, today)
            .await?)
    }

    /// 按 sku 提交请购（仅限启用商品）
    pub async fn request_by_sku(
        &self,
        sku: &str,
        quantity: i64,
        requester: &Requester,
        options: &RequestOptions,
        today: NaiveDate,
    ) -> ApiResult<Reconciliation> {
        let sku = sku.trim();
        if sku.is_empty() {
            return Err(ApiError::InvalidInput("sku 不能为空".to_string()));
        }

        let products = self.product_store.list_products(ProductFilter::active()).await?;
        let product = products
            .into_iter()
            .find(|p| p.sku == sku)
            .ok_or_else(|| ApiError::NotFound(format!("Product(sku={})不存在", sku)))?;
        debug!(sku = %sku, name = %product.name, "已定位请购商品");

        self.request_product(&product, quantity, requester, options, today)
            .await
    }

    /// 查询请购单（最新优先）
    pub async fn list_requests(&self, open_only: bool) -> ApiResult<Vec<RequestRecord>> {
        Ok(self
            .request_store
            .list_requests(RequestFilter { open_only })
            .await?)
    }
}
