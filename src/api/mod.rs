// ==========================================
// 商品目录后台 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供 CLI 调用
// ==========================================

pub mod error;
pub mod export_api;
pub mod import_api;
pub mod product_api;
pub mod request_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use export_api::ExportApi;
pub use import_api::ImportApi;
pub use product_api::{CatalogItem, CatalogPage, ProductApi};
pub use request_api::RequestApi;
