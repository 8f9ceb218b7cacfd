// ==========================================
// 商品导出API
// ==========================================

use crate::api::error::ApiResult;
use crate::config::InterchangeConfigReader;
use crate::exporter::{ExportFile, ProductExporter};
use crate::repository::ProductStore;
use chrono::NaiveDate;
use std::sync::Arc;

pub struct ExportApi {
    store: Arc<dyn ProductStore>,
    config: Arc<dyn InterchangeConfigReader>,
}

impl ExportApi {
    pub fn new(store: Arc<dyn ProductStore>, config: Arc<dyn InterchangeConfigReader>) -> Self {
        Self { store, config }
    }

    /// 导出全部启用商品
    ///
    /// # 参数
    /// - today: 文件名中的日期
    pub async fn export_products(&self, today: NaiveDate) -> ApiResult<ExportFile> {
        let prefix = self.config.get_export_file_prefix().await?;
        let exporter = ProductExporter::new(self.store.clone(), prefix);
        Ok(exporter.export_products(today).await?)
    }
}
