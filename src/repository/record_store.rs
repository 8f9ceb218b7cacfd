// ==========================================
// 商品目录后台 - Record Store 接口
// ==========================================
// 职责: 定义核心层依赖的外部存储接口（不包含实现）
// 红线: Repository 不含业务规则，只做数据 CRUD
// 实现者: ProductRepository / RequestRepository（rusqlite）
// ==========================================

use crate::domain::{NewRequest, ProductRecord, RequestPatch, RequestRecord};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use std::sync::Arc;

/// 商品查询条件
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub active_only: bool,
}

impl ProductFilter {
    pub fn active() -> Self {
        Self { active_only: true }
    }
}

/// 请购单查询条件
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestFilter {
    pub open_only: bool,
}

impl RequestFilter {
    pub fn open() -> Self {
        Self { open_only: true }
    }
}

// ==========================================
// ProductStore Trait
// ==========================================
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// 查询商品列表
    async fn list_products(&self, filter: ProductFilter) -> RepositoryResult<Vec<ProductRecord>>;

    /// 按 sku 批量 upsert（整批事务化）
    ///
    /// # 返回
    /// - Ok(usize): 写入的记录数
    /// - Err: 整批失败（事务回滚）
    async fn upsert_products(&self, records: &[ProductRecord]) -> RepositoryResult<usize>;

    /// 软删除（is_active := false）
    async fn delete_product(&self, id: &str) -> RepositoryResult<()>;
}

// ==========================================
// RequestStore Trait
// ==========================================
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// 查询请购单列表（按创建时间倒序）
    async fn list_requests(&self, filter: RequestFilter) -> RepositoryResult<Vec<RequestRecord>>;

    /// 创建请购单
    async fn create_request(&self, request: NewRequest) -> RepositoryResult<RequestRecord>;

    /// 条件更新请购单
    ///
    /// 仅当存储中的 revision 等于 expected_revision 时写入，
    /// 否则返回 RepositoryError::OptimisticLockFailure
    async fn update_request(
        &self,
        id: &str,
        patch: RequestPatch,
        expected_revision: i32,
    ) -> RepositoryResult<RequestRecord>;
}

#[async_trait]
impl<T: ProductStore + ?Sized> ProductStore for Arc<T> {
    async fn list_products(&self, filter: ProductFilter) -> RepositoryResult<Vec<ProductRecord>> {
        (**self).list_products(filter).await
    }

    async fn upsert_products(&self, records: &[ProductRecord]) -> RepositoryResult<usize> {
        (**self).upsert_products(records).await
    }

    async fn delete_product(&self, id: &str) -> RepositoryResult<()> {
        (**self).delete_product(id).await
    }
}

#[async_trait]
impl<T: RequestStore + ?Sized> RequestStore for Arc<T> {
    async fn list_requests(&self, filter: RequestFilter) -> RepositoryResult<Vec<RequestRecord>> {
        (**self).list_requests(filter).await
    }

    async fn create_request(&self, request: NewRequest) -> RepositoryResult<RequestRecord> {
        (**self).create_request(request).await
    }

    async fn update_request(
        &self,
        id: &str,
        patch: RequestPatch,
        expected_revision: i32,
    ) -> RepositoryResult<RequestRecord> {
        (**self).update_request(id, patch, expected_revision).await
    }
}
