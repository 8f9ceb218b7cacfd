// ==========================================
// 商品目录后台 - 配置读取 Trait
// ==========================================
// 职责: 定义导入/导出/请购所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::config_manager::ConfigResult;
use crate::domain::ImportMode;
use async_trait::async_trait;

// ==========================================
// InterchangeConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait InterchangeConfigReader: Send + Sync {
    /// 每批写入条数
    ///
    /// # 默认值
    /// - 50
    async fn get_import_batch_size(&self) -> ConfigResult<usize>;

    /// 未显式指定时的导入模式
    ///
    /// # 默认值
    /// - header
    async fn get_default_import_mode(&self) -> ConfigResult<ImportMode>;

    /// 导出文件名前缀
    ///
    /// # 默认值
    /// - products_export
    async fn get_export_file_prefix(&self) -> ConfigResult<String>;

    /// 请购合并写入的最大尝试次数
    ///
    /// # 默认值
    /// - 3
    async fn get_max_merge_attempts(&self) -> ConfigResult<usize>;
}
