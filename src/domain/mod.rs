// ==========================================
// 商品目录后台 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod product;
pub mod request;
pub mod types;

// 重导出核心类型
pub use product::ProductRecord;
pub use request::{
    extract_quantity, replace_quantity, request_subject, NewRequest, RequestMessage,
    RequestPatch, RequestRecord, Requester,
};
pub use types::{Availability, ImportMode, RequestPriority, RequestStatus};
