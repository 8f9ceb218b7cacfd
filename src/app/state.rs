// ==========================================
// 商品目录后台 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 连接: 所有仓储与配置共享同一个 SQLite 连接
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{ExportApi, ImportApi, ProductApi, RequestApi};
use crate::config::{ConfigManager, InterchangeConfigReader};
use crate::db::{init_schema, open_sqlite_connection};
use crate::repository::{ProductRepository, ProductStore, RequestRepository, RequestStore};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "STOREFRONT_DB_PATH";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 商品导入API
    pub import_api: Arc<ImportApi>,

    /// 商品导出API
    pub export_api: Arc<ExportApi>,

    /// 请购API
    pub request_api: Arc<RequestApi>,

    /// 商品API
    pub product_api: Arc<ProductApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 1. 打开连接并应用统一 PRAGMA
    /// 2. 建表（幂等）
    /// 3. 创建 Repository / 配置 / API 实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let product_store: Arc<dyn ProductStore> =
            Arc::new(ProductRepository::from_connection(conn.clone()));
        let request_store: Arc<dyn RequestStore> =
            Arc::new(RequestRepository::from_connection(conn.clone()));

        let config_manager = Arc::new(ConfigManager::from_connection(conn));
        let config: Arc<dyn InterchangeConfigReader> = config_manager.clone();

        // ==========================================
        // 创建API实例
        // ==========================================
        let import_api = Arc::new(ImportApi::new(product_store.clone(), config.clone()));
        let export_api = Arc::new(ExportApi::new(product_store.clone(), config.clone()));
        let request_api = Arc::new(RequestApi::new(
            product_store.clone(),
            request_store,
            config,
        ));
        let product_api = Arc::new(ProductApi::new(product_store));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            config_manager,
            import_api,
            export_api,
            request_api,
            product_api,
        })
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

/// 获取默认数据库路径
///
/// 优先读取 STOREFRONT_DB_PATH，否则使用用户数据目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./storefront.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("storefront-interchange");
        // 目录创建失败时由打开连接处报错
        std::fs::create_dir_all(&dir).ok();
        path = dir.join("storefront.db");
    }

    path.to_string_lossy().to_string()
}
