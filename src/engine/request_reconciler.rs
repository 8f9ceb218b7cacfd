// ==========================================
// 商品目录后台 - 请购合并/新建引擎
// ==========================================
// 职责: 对同一提交人、同一商品的未关闭请购单累加数量，
//       找不到时新建请购单
// 红线: 前置条件失败时零存储调用
// 并发:
// - 同一 sku 经 ProductLockRegistry 串行
// - 合并写入以 revision 为条件，冲突时重读重试
// ==========================================

use crate::domain::{
    replace_quantity, request_subject, NewRequest, ProductRecord, RequestMessage, RequestPatch,
    RequestPriority, RequestRecord, RequestStatus, Requester,
};
use crate::engine::pricing::{display_price, format_usd};
use crate::engine::product_lock::ProductLockRegistry;
use crate::engine::request_policy::{check_request_preconditions, PreconditionViolation};
use crate::repository::{RepositoryError, RequestFilter, RequestStore};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// 合并写入的默认最大尝试次数
pub const DEFAULT_MAX_MERGE_ATTEMPTS: usize = 3;

// ==========================================
// 输入/输出
// ==========================================

/// 调用方可选参数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestOptions {
    pub priority: Option<RequestPriority>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileAction {
    Created,
    Merged,
}

/// 对账结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub action: ReconcileAction,
    pub new_quantity: u32,
    pub request_id: String,
}

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("前置条件不满足: {0}")]
    Precondition(#[from] PreconditionViolation),

    #[error("存储访问失败: {0}")]
    Store(#[from] RepositoryError),
}

// ==========================================
// RequestReconciler
// ==========================================
pub struct RequestReconciler<S>
where
    S: RequestStore,
{
    store: S,
    locks: Arc<ProductLockRegistry>,
    max_attempts: usize,
}

impl<S> RequestReconciler<S>
where
    S: RequestStore,
{
    /// 创建对账引擎（max_attempts 至少为 1）
    pub fn new(store: S, max_attempts: usize) -> Self {
        Self::with_locks(store, Arc::new(ProductLockRegistry::new()), max_attempts)
    }

    /// 与其他引擎实例共享锁注册表
    pub fn with_locks(store: S, locks: Arc<ProductLockRegistry>, max_attempts: usize) -> Self {
        Self {
            store,
            locks,
            max_attempts: max_attempts.max(1),
        }
    }

    /// 提交请购: 合并到已有未关闭请购单，或新建
    ///
    /// # 参数
    /// - product: 目标商品
    /// - quantity: 本次追加数量（>= 1）
    /// - requester: 提交人（姓名/邮箱/用户 ID）
    /// - options: 优先级 / 附加说明
    /// - today: 判定预订截止与促销价使用的日期
    ///
    /// # 返回
    /// - Ok(Reconciliation): Created / Merged 以及最新数量
    /// - Err(Precondition): 未访问存储
    /// - Err(Store): 存储错误（重试耗尽时为 OptimisticLockFailure）
    #[instrument(skip(self, product, requester, options), fields(sku = %product.sku))]
    pub async fn request_product(
        &self,
        product: &ProductRecord,
        quantity: i64,
        requester: &Requester,
        options: &RequestOptions,
        today: NaiveDate,
    ) -> Result<Reconciliation, ReconcileError> {
        if let Err(violation) = check_request_preconditions(product, quantity, today) {
            warn!(reason = %violation, "请购前置条件不满足");
            return Err(violation.into());
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        let lock_key = if product.sku.trim().is_empty() {
            product.name.as_str()
        } else {
            product.sku.as_str()
        };
        let _guard = self.locks.acquire(lock_key).await;

        let mut attempt = 0;
        loop {
            attempt += 1;

            let open_requests = self.store.list_requests(RequestFilter::open()).await?;
            let target = find_merge_target(open_requests, product, requester);

            let Some(existing) = target else {
                return self
                    .create_request(product, quantity, requester, options, today)
                    .await;
            };

            let new_quantity = existing.quantity().saturating_add(quantity);
            let patch = RequestPatch::message(
                replace_quantity(&existing.message, new_quantity),
                Utc::now(),
            );

            match self
                .store
                .update_request(&existing.id, patch, existing.revision)
                .await
            {
                Ok(updated) => {
                    info!(
                        request_id = %updated.id,
                        previous = existing.quantity(),
                        new_quantity = new_quantity,
                        "已合并到现有请购单"
                    );
                    return Ok(Reconciliation {
                        action: ReconcileAction::Merged,
                        new_quantity,
                        request_id: updated.id,
                    });
                }
                Err(RepositoryError::OptimisticLockFailure { .. })
                    if attempt < self.max_attempts =>
                {
                    warn!(
                        request_id = %existing.id,
                        attempt = attempt,
                        "请购单版本冲突，重新读取后重试"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn create_request(
        &self,
        product: &ProductRecord,
        quantity: u32,
        requester: &Requester,
        options: &RequestOptions,
        today: NaiveDate,
    ) -> Result<Reconciliation, ReconcileError> {
        let message = RequestMessage {
            product_name: product.name.clone(),
            sku: product.sku.clone(),
            distributor: product.distributor.clone(),
            product_line: product.product_line.clone(),
            price_display: format_usd(display_price(product, today)),
            quantity,
            availability: product.availability.as_str().to_string(),
            notes: options.notes.clone(),
        };

        let request = NewRequest {
            customer_name: requester.name.clone(),
            customer_email: requester.email.clone(),
            subject: request_subject(&product.name),
            message: message.render(),
            priority: options.priority.unwrap_or_default(),
            status: RequestStatus::Pending,
            assigned_to: requester.id.clone(),
        };

        let created = self.store.create_request(request).await?;
        info!(request_id = %created.id, quantity = quantity, "已新建请购单");

        Ok(Reconciliation {
            action: ReconcileAction::Created,
            new_quantity: quantity,
            request_id: created.id,
        })
    }
}

/// 选取合并目标: 存储顺序（最新优先）中第一条
/// 未关闭、属于同一提交人、标题引用该商品的请购单
fn find_merge_target(
    requests: Vec<RequestRecord>,
    product: &ProductRecord,
    requester: &Requester,
) -> Option<RequestRecord> {
    let target = requests.into_iter().find(|r| {
        r.status.is_open() && r.belongs_to(requester) && r.references_product(&product.name)
    });
    if let Some(found) = &target {
        debug!(request_id = %found.id, quantity = found.quantity(), "找到可合并请购单");
    }
    target
}
