// ==========================================
// 商品目录后台 - 核心库
// ==========================================
// 职责: 商品 CSV 导入导出 + 请购单合并/新建
// 技术栈: Rust + SQLite + Tokio
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 导出层 - CSV 生成
pub mod exporter;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{Availability, ImportMode, RequestPriority, RequestStatus};

// 领域实体
pub use domain::{NewRequest, ProductRecord, RequestPatch, RequestRecord, Requester};

// 引擎
pub use engine::{ProductLockRegistry, RequestReconciler};

// 导入导出
pub use exporter::{export_csv, ProductExporter};
pub use importer::{parse_csv, ProductImporterImpl};

// API
pub use api::{ExportApi, ImportApi, ProductApi, RequestApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "storefront-interchange";
