// ==========================================
// 商品目录后台 - 导出层
// ==========================================
// 职责: 启用商品 → 规范 CSV 文本 + 文件名
// ==========================================

pub mod csv_exporter;

pub use csv_exporter::{
    export_csv, export_file_name, ExportError, ExportFile, ProductExporter, DEFAULT_FILE_PREFIX,
    EXPORT_COLUMNS, EXPORT_CONTENT_TYPE,
};
