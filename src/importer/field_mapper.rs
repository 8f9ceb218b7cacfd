// ==========================================
// 商品目录后台 - 字段映射器实现
// ==========================================
// 职责: 扫描后的字段 → ProductRecord
// 模式:
// - Header: 首行列名经 ProductColumn 显式分发，未知列忽略
// - Positional: 首行丢弃，按固定 11 列顺序映射
// ==========================================

use crate::domain::{Availability, ImportMode, ProductRecord};
use crate::importer::csv_scanner::scan_text;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::product_importer_trait::{
    DataCleaner as DataCleanerTrait, FieldMapper as FieldMapperTrait,
};
use serde::Serialize;
use tracing::debug;

// ==========================================
// ProductColumn - 可识别列
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductColumn {
    Sku,
    Name,
    Distributor,
    ProductLine,
    Category,
    Description,
    WholesalePrice,
    Cost,
    OverridePrice,
    OverrideEndDate,
    OrdersDueDate,
    ReleaseDate,
    Availability,
    InStock,
    ImageUrl,
    ProductUrl,
    Approved,
    IsSample,
}

/// 位置模式列顺序（与导出列顺序一致）
pub const POSITIONAL_COLUMNS: [ProductColumn; 11] = [
    ProductColumn::ProductLine,
    ProductColumn::Sku,
    ProductColumn::Name,
    ProductColumn::WholesalePrice,
    ProductColumn::ReleaseDate,
    ProductColumn::OrdersDueDate,
    ProductColumn::Availability,
    ProductColumn::InStock,
    ProductColumn::ImageUrl,
    ProductColumn::ProductUrl,
    ProductColumn::Distributor,
];

impl ProductColumn {
    /// 列名（线上格式）
    pub fn header_name(&self) -> &'static str {
        match self {
            ProductColumn::Sku => "sku",
            ProductColumn::Name => "name",
            ProductColumn::Distributor => "distributor",
            ProductColumn::ProductLine => "product_line",
            ProductColumn::Category => "category",
            ProductColumn::Description => "description",
            ProductColumn::WholesalePrice => "wholesale_price",
            ProductColumn::Cost => "cost",
            ProductColumn::OverridePrice => "override_price",
            ProductColumn::OverrideEndDate => "override_end_date",
            ProductColumn::OrdersDueDate => "orders_due_date",
            ProductColumn::ReleaseDate => "release_date",
            ProductColumn::Availability => "availability",
            ProductColumn::InStock => "in_stock",
            ProductColumn::ImageUrl => "image_url",
            ProductColumn::ProductUrl => "product_url",
            ProductColumn::Approved => "approved",
            ProductColumn::IsSample => "is_sample",
        }
    }

    /// 按列名查找（忽略大小写与首尾空白）
    pub fn from_header(header: &str) -> Option<Self> {
        match header.trim().to_ascii_lowercase().as_str() {
            "sku" => Some(ProductColumn::Sku),
            "name" => Some(ProductColumn::Name),
            "distributor" => Some(ProductColumn::Distributor),
            "product_line" => Some(ProductColumn::ProductLine),
            "category" => Some(ProductColumn::Category),
            "description" => Some(ProductColumn::Description),
            "wholesale_price" => Some(ProductColumn::WholesalePrice),
            "cost" => Some(ProductColumn::Cost),
            "override_price" => Some(ProductColumn::OverridePrice),
            "override_end_date" => Some(ProductColumn::OverrideEndDate),
            "orders_due_date" => Some(ProductColumn::OrdersDueDate),
            "release_date" => Some(ProductColumn::ReleaseDate),
            "availability" => Some(ProductColumn::Availability),
            "in_stock" => Some(ProductColumn::InStock),
            "image_url" => Some(ProductColumn::ImageUrl),
            "product_url" => Some(ProductColumn::ProductUrl),
            "approved" => Some(ProductColumn::Approved),
            "is_sample" => Some(ProductColumn::IsSample),
            _ => None,
        }
    }

    /// 将单个字段写入记录
    fn apply(
        &self,
        record: &mut ProductRecord,
        value: &str,
        cleaner: &DataCleaner,
        numeric_flags: bool,
    ) {
        match self {
            ProductColumn::Sku => record.sku = value.to_string(),
            ProductColumn::Name => record.name = value.to_string(),
            ProductColumn::Distributor => record.distributor = value.to_string(),
            ProductColumn::ProductLine => record.product_line = value.to_string(),
            ProductColumn::Category => record.category = value.to_string(),
            ProductColumn::Description => record.description = cleaner.normalize_null(value),
            ProductColumn::WholesalePrice => {
                record.set_wholesale_price(cleaner.parse_price(value))
            }
            ProductColumn::Cost => record.cost = cleaner.parse_optional_price(value),
            ProductColumn::OverridePrice => {
                record.override_price = cleaner.parse_optional_price(value)
            }
            ProductColumn::OverrideEndDate => {
                record.override_end_date = cleaner.normalize_date(value)
            }
            ProductColumn::OrdersDueDate => record.orders_due_date = cleaner.normalize_date(value),
            ProductColumn::ReleaseDate => record.release_date = cleaner.normalize_date(value),
            ProductColumn::Availability => {
                record.availability = Availability::parse_lenient(value)
            }
            ProductColumn::InStock => record.in_stock = cleaner.parse_flag(value, numeric_flags),
            ProductColumn::ImageUrl => record.image_url = cleaner.normalize_null(value),
            ProductColumn::ProductUrl => record.product_url = cleaner.normalize_null(value),
            ProductColumn::Approved => record.approved = cleaner.parse_flag(value, numeric_flags),
            ProductColumn::IsSample => record.is_sample = cleaner.parse_flag(value, numeric_flags),
        }
    }
}

fn field_at(fields: &[String], idx: usize) -> &str {
    fields.get(idx).map(String::as_str).unwrap_or("")
}

// ==========================================
// HeaderFieldMapper - 按表头映射
// ==========================================
pub struct HeaderFieldMapper {
    columns: Vec<Option<ProductColumn>>,
    cleaner: DataCleaner,
}

impl HeaderFieldMapper {
    pub fn new(headers: &[String]) -> Self {
        let columns = headers
            .iter()
            .map(|h| ProductColumn::from_header(h))
            .collect::<Vec<_>>();

        let ignored: Vec<&str> = headers
            .iter()
            .zip(&columns)
            .filter(|(_, c)| c.is_none())
            .map(|(h, _)| h.as_str())
            .collect();
        if !ignored.is_empty() {
            debug!(ignored = ?ignored, "忽略未知列");
        }

        Self {
            columns,
            cleaner: DataCleaner,
        }
    }
}

impl FieldMapperTrait for HeaderFieldMapper {
    fn map_row(&self, fields: &[String]) -> ProductRecord {
        let mut record = ProductRecord::default();
        for (idx, column) in self.columns.iter().enumerate() {
            if let Some(column) = column {
                column.apply(&mut record, field_at(fields, idx), &self.cleaner, true);
            }
        }
        record.apply_derived_defaults();
        record
    }
}

// ==========================================
// PositionalFieldMapper - 按固定列序映射
// ==========================================
pub struct PositionalFieldMapper {
    cleaner: DataCleaner,
}

impl PositionalFieldMapper {
    pub fn new() -> Self {
        Self {
            cleaner: DataCleaner,
        }
    }
}

impl Default for PositionalFieldMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldMapperTrait for PositionalFieldMapper {
    fn map_row(&self, fields: &[String]) -> ProductRecord {
        let mut record = ProductRecord::default();
        for (idx, column) in POSITIONAL_COLUMNS.iter().enumerate() {
            column.apply(&mut record, field_at(fields, idx), &self.cleaner, false);
        }
        record.apply_derived_defaults();
        record
    }
}

// ==========================================
// 解析结果
// ==========================================

/// 被拒绝的行（缺少必填字段）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRow {
    pub line_number: usize,
    pub fields: Vec<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub records: Vec<ProductRecord>,
    pub rejected: Vec<RejectedRow>,
    pub total_rows: usize, // 非空数据行数（不含表头）
}

/// 解析 CSV 文本
///
/// 不会失败: 格式问题回落默认值，缺少 sku/name 的行进入 rejected
pub fn parse_csv(text: &str, mode: ImportMode) -> ParseOutcome {
    let (header, rows) = scan_text(text);
    let Some(header) = header else {
        return ParseOutcome::default();
    };

    let mapper: Box<dyn FieldMapperTrait> = match mode {
        ImportMode::Header => Box::new(HeaderFieldMapper::new(&header.fields)),
        ImportMode::Positional => Box::new(PositionalFieldMapper::new()),
    };

    let mut outcome = ParseOutcome {
        total_rows: rows.len(),
        ..ParseOutcome::default()
    };

    for row in rows {
        let record = mapper.map_row(&row.fields);
        match missing_required_reason(&record) {
            None => outcome.records.push(record),
            Some(reason) => {
                debug!(line_number = row.line_number, reason = %reason, "拒绝缺少必填字段的行");
                outcome.rejected.push(RejectedRow {
                    line_number: row.line_number,
                    fields: row.fields,
                    reason,
                });
            }
        }
    }

    outcome
}

fn missing_required_reason(record: &ProductRecord) -> Option<String> {
    match (record.sku.trim().is_empty(), record.name.trim().is_empty()) {
        (false, false) => None,
        (true, true) => Some("missing sku and name".to_string()),
        (true, false) => Some("missing sku".to_string()),
        (false, true) => Some("missing name".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_header_mode_maps_known_columns() {
        let text = "SKU,name,wholesale_price,in_stock,approved,color\n\
                    A-1,Widget,12.5,1,TRUE,red";
        let outcome = parse_csv(text, ImportMode::Header);

        assert_eq!(outcome.records.len(), 1);
        let record = &outcome.records[0];
        assert_eq!(record.sku, "A-1");
        assert_eq!(record.price, 12.5);
        assert!(record.in_stock);
        assert!(record.approved);
        assert_eq!(record.stock_quantity, 1);
        assert!(record.is_active);
    }

    #[test]
    fn test_header_mode_short_line_defaults() {
        let text = "sku,name,availability,override_price\nA-1,Widget";
        let outcome = parse_csv(text, ImportMode::Header);

        let record = &outcome.records[0];
        assert_eq!(record.availability, Availability::Open);
        assert_eq!(record.override_price, None);
    }

    #[test]
    fn test_positional_mode_skips_first_line() {
        let text = "line,sku,name,price,release,due,availability,stock,img,url,dist\n\
                    Tools,A-1,Widget,9.99,3/5/2024,---,pre-order,True,,,Acme";
        let outcome = parse_csv(text, ImportMode::Positional);

        assert_eq!(outcome.total_rows, 1);
        let record = &outcome.records[0];
        assert_eq!(record.product_line, "Tools");
        assert_eq!(record.category, "Tools");
        assert_eq!(record.wholesale_price, 9.99);
        assert_eq!(record.release_date, NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(record.orders_due_date, None);
        assert_eq!(record.availability, Availability::PreOrder);
        assert!(record.in_stock);
        assert_eq!(record.image_url, None);
        assert_eq!(record.distributor, "Acme");
    }

    #[test]
    fn test_positional_mode_numeric_flag_is_false() {
        let text = "header\nTools,A-1,Widget,abc,,,open,1";
        let outcome = parse_csv(text, ImportMode::Positional);

        let record = &outcome.records[0];
        assert!(!record.in_stock);
        assert_eq!(record.wholesale_price, 0.0);
    }

    #[test]
    fn test_rejected_rows_carry_line_number() {
        let text = "sku,name\nA-1,Widget\n,Nameless\nB-2,";
        let outcome = parse_csv(text, ImportMode::Header);

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.rejected.len(), 2);
        assert_eq!(outcome.rejected[0].line_number, 3);
        assert_eq!(outcome.rejected[0].reason, "missing sku");
        assert_eq!(outcome.rejected[1].reason, "missing name");
    }

    #[test]
    fn test_empty_text() {
        let outcome = parse_csv("", ImportMode::Header);
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.total_rows, 0);
    }
}
