// ==========================================
// 商品导入API
// ==========================================
// 职责: 封装商品导入（文件 / 粘贴文本 / 上传内容）
// 配置: 批次大小与默认模式每次调用时从配置读取
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::InterchangeConfigReader;
use crate::domain::ImportMode;
use crate::importer::{is_csv_mime, CancelFlag, ProductImportReport, ProductImporter, ProductImporterImpl};
use crate::repository::ProductStore;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// 导入API
pub struct ImportApi {
    store: Arc<dyn ProductStore>,
    config: Arc<dyn InterchangeConfigReader>,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    pub fn new(store: Arc<dyn ProductStore>, config: Arc<dyn InterchangeConfigReader>) -> Self {
        Self { store, config }
    }

    async fn importer(&self) -> ApiResult<ProductImporterImpl<Arc<dyn ProductStore>>> {
        let batch_size = self.config.get_import_batch_size().await?;
        Ok(ProductImporterImpl::new(self.store.clone(), batch_size))
    }

    async fn resolve_mode(&self, mode: Option<ImportMode>) -> ApiResult<ImportMode> {
        match mode {
            Some(mode) => Ok(mode),
            None => Ok(self.config.get_default_import_mode().await?),
        }
    }

    /// 从 .csv 文件导入
    ///
    /// # 参数
    /// - file_path: 文件路径
    /// - mode: 导入模式（None 时取配置默认值）
    /// - cancel: 取消标志（批次之间检查）
    pub async fn import_file(
        &self,
        file_path: &Path,
        mode: Option<ImportMode>,
        cancel: &CancelFlag,
    ) -> ApiResult<ProductImportReport> {
        let mode = self.resolve_mode(mode).await?;
        let importer = self.importer().await?;
        let report = importer.import_from_file(file_path, mode, cancel).await?;
        info!(batch_id = %report.batch_id, imported = report.summary.imported, "文件导入完成");
        Ok(report)
    }

    /// 从粘贴文本导入
    pub async fn import_text(
        &self,
        text: &str,
        mode: Option<ImportMode>,
        cancel: &CancelFlag,
    ) -> ApiResult<ProductImportReport> {
        if text.trim().is_empty() {
            return Err(ApiError::InvalidInput("导入内容为空".to_string()));
        }
        let mode = self.resolve_mode(mode).await?;
        let importer = self.importer().await?;
        Ok(importer.import_from_text(text, mode, cancel).await?)
    }

    /// 导入上传内容（先校验 MIME）
    pub async fn import_upload(
        &self,
        mime_type: &str,
        content: &str,
        mode: Option<ImportMode>,
        cancel: &CancelFlag,
    ) -> ApiResult<ProductImportReport> {
        if !is_csv_mime(mime_type) {
            return Err(ApiError::InvalidInput(format!(
                "Please select a valid CSV file (mime={})",
                mime_type
            )));
        }
        self.import_text(crate::importer::file_parser::strip_bom(content), mode, cancel)
            .await
    }
}
