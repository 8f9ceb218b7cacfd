// ==========================================
// 商品目录后台 - 商品导入器实现
// ==========================================
// 职责: 整合导入流程，从文本/文件到存储
// 流程: 读取 → 扫描 → 映射 → 必填校验 → 分批 upsert
// 并发: 批次顺序写入，同一时刻至多一个写请求
// ==========================================

use crate::domain::{ImportMode, ProductRecord};
use crate::importer::cancel::CancelFlag;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{parse_csv, RejectedRow};
use crate::importer::file_parser::CsvFileReader;
use crate::importer::product_importer_trait::ProductImporter;
use crate::repository::ProductStore;
use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// 默认每批写入条数
pub const DEFAULT_BATCH_SIZE: usize = 50;

// ==========================================
// 导入结果
// ==========================================

/// 单批写入失败
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    pub batch_index: usize, // 0 起始
    pub size: usize,
    pub message: String,
}

/// 分批写入汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub failed: usize,
    pub skipped: usize, // 取消后未尝试的记录数
    pub failures: Vec<BatchFailure>,
    pub batches_attempted: usize,
    pub cancelled: bool,
}

/// 一次导入的完整报告
#[derive(Debug, Clone, Serialize)]
pub struct ProductImportReport {
    pub batch_id: String,
    pub mode: ImportMode,
    pub total_rows: usize,
    pub rejected: Vec<RejectedRow>,
    pub summary: ImportSummary,
    pub elapsed_ms: u64,
}

// ==========================================
// ProductImporterImpl
// ==========================================
pub struct ProductImporterImpl<S>
where
    S: ProductStore,
{
    store: S,
    batch_size: usize,
    file_reader: CsvFileReader,
}

impl<S> ProductImporterImpl<S>
where
    S: ProductStore,
{
    /// 创建导入器（batch_size 至少为 1）
    pub fn new(store: S, batch_size: usize) -> Self {
        Self {
            store,
            batch_size: batch_size.max(1),
            file_reader: CsvFileReader,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

#[async_trait]
impl<S> ProductImporter for ProductImporterImpl<S>
where
    S: ProductStore,
{
    #[instrument(skip(self, text, cancel), fields(batch_id))]
    async fn import_from_text(
        &self,
        text: &str,
        mode: ImportMode,
        cancel: &CancelFlag,
    ) -> ImportResult<ProductImportReport> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());
        info!(batch_id = %batch_id, mode = %mode, "开始导入商品数据");

        let outcome = parse_csv(text, mode);
        info!(
            total_rows = outcome.total_rows,
            valid = outcome.records.len(),
            rejected = outcome.rejected.len(),
            "CSV 解析完成"
        );

        if outcome.records.is_empty() {
            warn!(batch_id = %batch_id, "没有有效商品，跳过写入");
            return Err(ImportError::EmptyInput);
        }

        let summary = self.import_batch(&outcome.records, cancel).await;

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        info!(
            batch_id = %batch_id,
            imported = summary.imported,
            failed = summary.failed,
            skipped = summary.skipped,
            cancelled = summary.cancelled,
            elapsed_ms = elapsed_ms,
            "商品导入完成"
        );

        Ok(ProductImportReport {
            batch_id,
            mode,
            total_rows: outcome.total_rows,
            rejected: outcome.rejected,
            summary,
            elapsed_ms,
        })
    }

    #[instrument(skip(self, file_path, cancel), fields(file_path = %file_path.display()))]
    async fn import_from_file(
        &self,
        file_path: &Path,
        mode: ImportMode,
        cancel: &CancelFlag,
    ) -> ImportResult<ProductImportReport> {
        let text = self.file_reader.read_to_string(file_path)?;
        debug!(bytes = text.len(), "文件读取完成");
        self.import_from_text(&text, mode, cancel).await
    }

    async fn import_batch(
        &self,
        records: &[ProductRecord],
        cancel: &CancelFlag,
    ) -> ImportSummary {
        let mut summary = ImportSummary::default();

        for (batch_index, chunk) in records.chunks(self.batch_size).enumerate() {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                summary.skipped = records.len() - batch_index * self.batch_size;
                warn!(
                    batch_index = batch_index,
                    skipped = summary.skipped,
                    "导入已取消，剩余批次不再写入"
                );
                break;
            }

            summary.batches_attempted += 1;
            match self.store.upsert_products(chunk).await {
                Ok(_) => {
                    summary.imported += chunk.len();
                    debug!(batch_index = batch_index, size = chunk.len(), "批次写入成功");
                }
                Err(e) => {
                    summary.failed += chunk.len();
                    warn!(
                        batch_index = batch_index,
                        size = chunk.len(),
                        error = %e,
                        "批次写入失败，继续下一批"
                    );
                    summary.failures.push(BatchFailure {
                        batch_index,
                        size: chunk.len(),
                        message: e.to_string(),
                    });
                }
            }
        }

        summary
    }
}
