// ==========================================
// 商品目录后台 - 商品导入 Trait
// ==========================================
// 职责: 定义商品导入接口（不包含实现）
// 管道: 扫描 → 字段映射 → 清洗/派生 → 必填校验 → 分批 upsert
// ==========================================

use crate::domain::{ImportMode, ProductRecord};
use crate::importer::cancel::CancelFlag;
use crate::importer::error::ImportResult;
use crate::importer::product_importer_impl::{ImportSummary, ProductImportReport};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::Path;

// ==========================================
// ProductImporter Trait
// ==========================================
// 用途: 商品导入主接口
// 实现者: ProductImporterImpl
#[async_trait]
pub trait ProductImporter: Send + Sync {
    /// 从粘贴文本导入
    ///
    /// # 返回
    /// - Ok(ProductImportReport): 批次 ID / 行数 / 拒绝行 / 写入汇总
    /// - Err(ImportError::EmptyInput): 没有任何有效记录（不发生写入）
    async fn import_from_text(
        &self,
        text: &str,
        mode: ImportMode,
        cancel: &CancelFlag,
    ) -> ImportResult<ProductImportReport>;

    /// 从 .csv 文件导入
    ///
    /// # 返回
    /// - Err(FileNotFound / UnsupportedFormat / FileReadError): 文件层错误
    /// - 其余同 import_from_text
    async fn import_from_file(
        &self,
        file_path: &Path,
        mode: ImportMode,
        cancel: &CancelFlag,
    ) -> ImportResult<ProductImportReport>;

    /// 分批写入已解析记录
    ///
    /// # 说明
    /// - 每批一次 upsert_products，顺序执行
    /// - 单批失败记录后继续下一批
    /// - 每批之前检查取消标志
    async fn import_batch(
        &self,
        records: &[ProductRecord],
        cancel: &CancelFlag,
    ) -> ImportSummary;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 将扫描后的字段映射为 ProductRecord
// 实现者: HeaderFieldMapper, PositionalFieldMapper
pub trait FieldMapper: Send + Sync {
    /// 映射一行（缺失的尾部字段按空串处理）
    fn map_row(&self, fields: &[String]) -> ProductRecord;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 单字段清洗与类型转换（格式错误一律回落默认值，不报错）
// 实现者: data_cleaner::DataCleaner（importer 对外导出为 DataCleanerImpl）
pub trait DataCleaner: Send + Sync {
    /// 标准化 NULL 值（空字符串/空白 → None）
    fn normalize_null(&self, value: &str) -> Option<String>;

    /// 日期标准化
    ///
    /// - 空 / `---` → None
    /// - `YYYY-MM-DD` → 原样
    /// - 含 `/` → 按 `MM/DD/YYYY` 解析
    /// - 其他 → None
    fn normalize_date(&self, value: &str) -> Option<NaiveDate>;

    /// 价格解析（空值/无法解析/负数 → 0）
    fn parse_price(&self, value: &str) -> f64;

    /// 可选价格解析（空值/无法解析/负数 → None）
    fn parse_optional_price(&self, value: &str) -> Option<f64>;

    /// 布尔解析
    ///
    /// - accept_numeric = true: `true`（忽略大小写）或 `1`
    /// - accept_numeric = false: 仅 `true`（忽略大小写）
    fn parse_flag(&self, value: &str, accept_numeric: bool) -> bool;
}
