// ==========================================
// 商品目录后台 - 导入层
// ==========================================
// 职责: CSV 文本/文件 → 校验后的商品记录 → 分批写入
// 支持: 表头模式 / 位置模式
// ==========================================

// 模块声明
pub mod cancel;
pub mod csv_scanner;
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod product_importer_impl;
pub mod product_importer_trait;

// 重导出核心类型
pub use cancel::CancelFlag;
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use error::{ImportError, ImportResult};
pub use field_mapper::{
    parse_csv, HeaderFieldMapper, ParseOutcome, PositionalFieldMapper, ProductColumn,
    RejectedRow, POSITIONAL_COLUMNS,
};
pub use file_parser::{is_csv_mime, CsvFileReader};
pub use product_importer_impl::{
    BatchFailure, ImportSummary, ProductImportReport, ProductImporterImpl, DEFAULT_BATCH_SIZE,
};

// 重导出 Trait 接口
pub use product_importer_trait::{DataCleaner, FieldMapper, ProductImporter};
