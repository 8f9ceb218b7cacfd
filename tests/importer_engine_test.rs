// ==========================================
// 商品目录后台 - ProductImporter 分批写入测试
// ==========================================
// 覆盖: 批次切分 / 单批失败继续 / 空输入 / 取消 / 文件校验
// ==========================================

mod test_helpers;

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use storefront_interchange::domain::ImportMode;
use storefront_interchange::importer::{
    CancelFlag, ImportError, ProductImporter, ProductImporterImpl,
};
use tempfile::Builder;
use test_helpers::{generate_products, FakeProductStore};

fn csv_with_rows(n: usize) -> String {
    let mut text = String::from("sku,name,product_line,wholesale_price\n");
    for i in 0..n {
        text.push_str(&format!("SKU-{:04},Item {:04},Tools,9.5\n", i, i));
    }
    text
}

// ==========================================
// 批次切分
// ==========================================

#[tokio::test]
async fn test_batches_split_by_batch_size() {
    let store = Arc::new(FakeProductStore::new());
    let importer = ProductImporterImpl::new(store.clone(), 50);

    let summary = importer
        .import_batch(&generate_products(120), &CancelFlag::new())
        .await;

    assert_eq!(store.sizes(), vec![50, 50, 20]);
    assert_eq!(summary.imported, 120);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.batches_attempted, 3);
    assert!(summary.failures.is_empty());
    assert!(!summary.cancelled);
}

#[tokio::test]
async fn test_failed_batch_does_not_stop_later_batches() {
    let store = Arc::new(FakeProductStore::failing_batches(&[1]));
    let importer = ProductImporterImpl::new(store.clone(), 50);

    let summary = importer
        .import_batch(&generate_products(120), &CancelFlag::new())
        .await;

    assert_eq!(store.calls(), 3);
    assert_eq!(summary.imported, 70);
    assert_eq!(summary.failed, 50);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].batch_index, 1);
    assert_eq!(summary.failures[0].size, 50);
    assert!(summary.failures[0].message.contains("injected failure"));
}

#[tokio::test]
async fn test_zero_batch_size_is_clamped() {
    let store = Arc::new(FakeProductStore::new());
    let importer = ProductImporterImpl::new(store.clone(), 0);
    assert_eq!(importer.batch_size(), 1);

    let summary = importer
        .import_batch(&generate_products(3), &CancelFlag::new())
        .await;
    assert_eq!(store.sizes(), vec![1, 1, 1]);
    assert_eq!(summary.imported, 3);
}

// ==========================================
// 文本导入
// ==========================================

#[tokio::test]
async fn test_import_text_reports_rejected_rows() {
    let store = Arc::new(FakeProductStore::new());
    let importer = ProductImporterImpl::new(store.clone(), 50);

    let text = "sku,name\nA-1,Alpha\n,Missing Sku\nB-2,Beta\n";
    let report = importer
        .import_from_text(text, ImportMode::Header, &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(report.total_rows, 3);
    assert_eq!(report.summary.imported, 2);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].line_number, 3);
    assert_eq!(report.rejected[0].reason, "missing sku");
    assert!(!report.batch_id.is_empty());
    assert_eq!(store.sizes(), vec![2]);
}

#[tokio::test]
async fn test_header_only_input_makes_no_store_calls() {
    let store = Arc::new(FakeProductStore::new());
    let importer = ProductImporterImpl::new(store.clone(), 50);

    let result = importer
        .import_from_text("sku,name\n", ImportMode::Header, &CancelFlag::new())
        .await;

    assert!(matches!(result, Err(ImportError::EmptyInput)));
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_all_rows_rejected_is_empty_input() {
    let store = Arc::new(FakeProductStore::new());
    let importer = ProductImporterImpl::new(store.clone(), 50);

    let result = importer
        .import_from_text("sku,name\n,\n ,Nameless\n", ImportMode::Header, &CancelFlag::new())
        .await;

    assert!(matches!(result, Err(ImportError::EmptyInput)));
    assert_eq!(store.calls(), 0);
}

// ==========================================
// 取消
// ==========================================

#[tokio::test]
async fn test_cancel_between_batches_skips_remaining() {
    let cancel = CancelFlag::new();
    let store = Arc::new(FakeProductStore::cancelling_after(1, cancel.clone()));
    let importer = ProductImporterImpl::new(store.clone(), 50);

    let report = importer
        .import_from_text(&csv_with_rows(120), ImportMode::Header, &cancel)
        .await
        .unwrap();

    assert_eq!(store.sizes(), vec![50]);
    assert!(report.summary.cancelled);
    assert_eq!(report.summary.imported, 50);
    assert_eq!(report.summary.skipped, 70);
    assert_eq!(report.summary.batches_attempted, 1);
}

#[tokio::test]
async fn test_cancel_before_start_writes_nothing() {
    let cancel = CancelFlag::new();
    cancel.cancel();
    let store = Arc::new(FakeProductStore::new());
    let importer = ProductImporterImpl::new(store.clone(), 50);

    let summary = importer.import_batch(&generate_products(10), &cancel).await;

    assert_eq!(store.calls(), 0);
    assert!(summary.cancelled);
    assert_eq!(summary.skipped, 10);
    assert_eq!(summary.imported, 0);
}

// ==========================================
// 文件导入
// ==========================================

#[tokio::test]
async fn test_import_from_file() {
    let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
    write!(temp_file, "{}", csv_with_rows(5)).unwrap();

    let store = Arc::new(FakeProductStore::new());
    let importer = ProductImporterImpl::new(store.clone(), 2);

    let report = importer
        .import_from_file(temp_file.path(), ImportMode::Header, &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(report.summary.imported, 5);
    assert_eq!(store.sizes(), vec![2, 2, 1]);
    let stored = store.stored.lock().unwrap();
    assert_eq!(stored[0].wholesale_price, 9.5);
    assert_eq!(stored[0].price, 9.5);
}

#[tokio::test]
async fn test_import_from_missing_file() {
    let store = Arc::new(FakeProductStore::new());
    let importer = ProductImporterImpl::new(store.clone(), 50);

    let result = importer
        .import_from_file(
            Path::new("/nonexistent/products.csv"),
            ImportMode::Header,
            &CancelFlag::new(),
        )
        .await;

    assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_import_rejects_non_csv_extension() {
    let mut temp_file = Builder::new().suffix(".txt").tempfile().unwrap();
    write!(temp_file, "{}", csv_with_rows(2)).unwrap();

    let store = Arc::new(FakeProductStore::new());
    let importer = ProductImporterImpl::new(store.clone(), 50);

    let result = importer
        .import_from_file(temp_file.path(), ImportMode::Header, &CancelFlag::new())
        .await;

    assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    assert_eq!(store.calls(), 0);
}
