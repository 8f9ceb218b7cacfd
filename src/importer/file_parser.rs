// ==========================================
// 商品目录后台 - CSV 文件读取
// ==========================================
// 职责: 文件存在性 / 扩展名检查 / UTF-8 读取 / BOM 去除
// 支持: .csv（上传 MIME: text/csv 及常见别名）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use std::path::Path;

const UTF8_BOM: char = '\u{feff}';

/// 允许的上传 MIME 类型
pub const CSV_MIME_TYPES: [&str; 3] = ["text/csv", "application/csv", "application/vnd.ms-excel"];

/// 判断上传 MIME 是否为 CSV（忽略大小写与参数部分）
pub fn is_csv_mime(mime: &str) -> bool {
    let essence = mime.split(';').next().unwrap_or("").trim();
    CSV_MIME_TYPES
        .iter()
        .any(|accepted| essence.eq_ignore_ascii_case(accepted))
}

/// 去除 UTF-8 BOM
pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix(UTF8_BOM).unwrap_or(text)
}

// ==========================================
// CsvFileReader
// ==========================================
pub struct CsvFileReader;

impl CsvFileReader {
    /// 读取 .csv 文件为文本
    pub fn read_to_string(&self, file_path: &Path) -> ImportResult<String> {
        // 检查文件存在
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        // 检查扩展名
        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let bytes = std::fs::read(file_path)?;
        let text = String::from_utf8(bytes)
            .map_err(|e| ImportError::FileReadError(format!("非 UTF-8 编码: {}", e)))?;

        Ok(strip_bom(&text).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_read_csv_strips_bom() {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        write!(temp_file, "\u{feff}sku,name\nA-1,Widget\n").unwrap();

        let text = CsvFileReader.read_to_string(temp_file.path()).unwrap();
        assert!(text.starts_with("sku,name"));
    }

    #[test]
    fn test_read_csv_file_not_found() {
        let result = CsvFileReader.read_to_string(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_read_csv_unsupported_extension() {
        let temp_file = Builder::new().suffix(".xlsx").tempfile().unwrap();
        let result = CsvFileReader.read_to_string(temp_file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(ext)) if ext == "xlsx"));
    }

    #[test]
    fn test_is_csv_mime() {
        assert!(is_csv_mime("text/csv"));
        assert!(is_csv_mime("Text/CSV; charset=utf-8"));
        assert!(is_csv_mime("application/vnd.ms-excel"));
        assert!(!is_csv_mime("application/json"));
    }
}
