// ==========================================
// 商品目录后台 - CSV 导出
// ==========================================
// 列顺序与位置模式导入一致，导出文件可原样再导入
// 转义: 含 `,` / `"` / `\n` 的字段加引号，内部引号双写（单独的 `\r` 不触发）
// 行分隔: `\n`，末行无结束符
// ==========================================

use crate::domain::ProductRecord;
use crate::repository::{ProductFilter, ProductStore, RepositoryError};
use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;
use std::borrow::Cow;
use thiserror::Error;
use tracing::{info, instrument};

/// 导出列（与 POSITIONAL_COLUMNS 同序）
pub const EXPORT_COLUMNS: [&str; 11] = [
    "product_line",
    "sku",
    "name",
    "wholesale_price",
    "release_date",
    "orders_due_date",
    "availability",
    "in_stock",
    "image_url",
    "product_url",
    "distributor",
];

/// 导出文件 MIME
pub const EXPORT_CONTENT_TYPE: &str = "text/csv;charset=utf-8";

/// 默认导出文件名前缀
pub const DEFAULT_FILE_PREFIX: &str = "products_export";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV 写入失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV 缓冲区读取失败: {0}")]
    Buffer(String),

    #[error("存储访问失败: {0}")]
    Store(#[from] RepositoryError),
}

/// 导出文件
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub row_count: usize,
}

/// 导出文件名: `<prefix>_<YYYY-MM-DD>.csv`
pub fn export_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}_{}.csv", prefix, date.format("%Y-%m-%d"))
}

fn export_row(product: &ProductRecord) -> [String; 11] {
    let date = |d: Option<NaiveDate>| d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();

    [
        product.product_line.clone(),
        product.sku.clone(),
        product.name.clone(),
        product.base_price().to_string(),
        date(product.release_date),
        date(product.orders_due_date),
        product.availability.as_str().to_string(),
        if product.in_stock { "True" } else { "False" }.to_string(),
        product.image_url.clone().unwrap_or_default(),
        product.product_url.clone().unwrap_or_default(),
        product.distributor.clone(),
    ]
}

/// 单字段转义
pub fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// 序列化为 CSV 文本（表头 + 每条记录一行）
pub fn export_csv(records: &[ProductRecord]) -> Result<String, ExportError> {
    // 字段已由 escape_field 转义，写出器不再加引号
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(EXPORT_COLUMNS)?;
    for record in records {
        let row = export_row(record);
        writer.write_record(row.iter().map(|field| escape_field(field).into_owned()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Buffer(e.to_string()))?;
    let mut text = String::from_utf8(bytes).map_err(|e| ExportError::Buffer(e.to_string()))?;

    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

// ==========================================
// ProductExporter - 读取启用商品并导出
// ==========================================
pub struct ProductExporter<S>
where
    S: ProductStore,
{
    store: S,
    file_prefix: String,
}

impl<S> ProductExporter<S>
where
    S: ProductStore,
{
    pub fn new(store: S, file_prefix: impl Into<String>) -> Self {
        Self {
            store,
            file_prefix: file_prefix.into(),
        }
    }

    /// 导出全部启用商品（按 product_line, name 升序）
    #[instrument(skip(self))]
    pub async fn export_products(&self, today: NaiveDate) -> Result<ExportFile, ExportError> {
        let mut products = self.store.list_products(ProductFilter::active()).await?;
        products.sort_by(|a, b| {
            a.product_line
                .cmp(&b.product_line)
                .then_with(|| a.name.cmp(&b.name))
        });

        let content = export_csv(&products)?;
        let file = ExportFile {
            file_name: export_file_name(&self.file_prefix, today),
            content_type: EXPORT_CONTENT_TYPE,
            bytes: content.into_bytes(),
            row_count: products.len(),
        };

        info!(file_name = %file.file_name, rows = file.row_count, "商品导出完成");
        Ok(file)
    }
}
