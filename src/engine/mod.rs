// ==========================================
// 商品目录后台 - 引擎层
// ==========================================
// 职责: 实现业务规则引擎,不拼 SQL
// 红线: Engine 不拼 SQL, 拒绝必须输出原因
// ==========================================

pub mod catalog_filter;
pub mod pricing;
pub mod product_lock;
pub mod request_policy;
pub mod request_reconciler;

// 重导出核心引擎
pub use catalog_filter::{CatalogFacets, CatalogFilter};
pub use pricing::{display_price, format_usd, has_active_override, stock_status, StockStatus};
pub use product_lock::{ProductLockGuard, ProductLockRegistry};
pub use request_policy::{check_request_preconditions, is_requestable, PreconditionViolation};
pub use request_reconciler::{
    ReconcileAction, ReconcileError, Reconciliation, RequestOptions, RequestReconciler,
    DEFAULT_MAX_MERGE_ATTEMPTS,
};
