// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库初始化 / 测试数据生成 / 内存版存储替身
// ==========================================

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use std::collections::HashSet;
use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use storefront_interchange::domain::{
    request_subject, Availability, NewRequest, ProductRecord, RequestMessage, RequestPatch,
    RequestPriority, RequestRecord, RequestStatus, Requester,
};
use storefront_interchange::db::{init_schema, open_sqlite_connection};
use storefront_interchange::importer::CancelFlag;
use storefront_interchange::repository::{
    ProductFilter, ProductStore, RepositoryError, RepositoryResult, RequestFilter, RequestStore,
};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_string_lossy().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开共享连接（仓储与配置共用）
pub fn open_shared_connection(db_path: &str) -> Arc<Mutex<Connection>> {
    let conn = open_sqlite_connection(db_path).expect("打开测试数据库失败");
    Arc::new(Mutex::new(conn))
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// 已审批、有库存、可正常订购的商品
pub fn sample_product(sku: &str, name: &str, product_line: &str) -> ProductRecord {
    let mut product = ProductRecord::new(sku, name);
    product.product_line = product_line.to_string();
    product.distributor = "Acme Supply".to_string();
    product.set_wholesale_price(10.0);
    product.in_stock = true;
    product.approved = true;
    product.availability = Availability::Open;
    product.apply_derived_defaults();
    product
}

/// 生成 n 条不同 sku 的商品
pub fn generate_products(n: usize) -> Vec<ProductRecord> {
    (0..n)
        .map(|i| sample_product(&format!("SKU-{:04}", i), &format!("Item {:04}", i), "Tools"))
        .collect()
}

pub fn requester(name: &str, email: &str, id: Option<&str>) -> Requester {
    Requester {
        name: name.to_string(),
        email: email.to_string(),
        id: id.map(str::to_string),
    }
}

/// 以标准正文构造一条已存在的请购单
pub fn existing_request(
    product: &ProductRecord,
    owner: &Requester,
    quantity: u32,
    status: RequestStatus,
) -> RequestRecord {
    let message = RequestMessage {
        product_name: product.name.clone(),
        sku: product.sku.clone(),
        distributor: product.distributor.clone(),
        product_line: product.product_line.clone(),
        price_display: "$10.00".to_string(),
        quantity,
        availability: product.availability.as_str().to_string(),
        notes: None,
    };

    RequestRecord {
        id: uuid::Uuid::new_v4().to_string(),
        customer_name: owner.name.clone(),
        customer_email: owner.email.clone(),
        subject: request_subject(&product.name),
        message: message.render(),
        priority: RequestPriority::Medium,
        status,
        assigned_to: owner.id.clone(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
        revision: 0,
    }
}

// ==========================================
// FakeProductStore - 记录每批大小，可指定失败批次
// ==========================================
#[derive(Default)]
pub struct FakeProductStore {
    pub chunk_sizes: Mutex<Vec<usize>>,
    pub stored: Mutex<Vec<ProductRecord>>,
    fail_batches: HashSet<usize>,
    cancel_after: Option<(usize, CancelFlag)>,
}

impl FakeProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定批次（0 起始）写入失败
    pub fn failing_batches(batches: &[usize]) -> Self {
        Self {
            fail_batches: batches.iter().copied().collect(),
            ..Self::default()
        }
    }

    /// 第 n 次写入后触发取消
    pub fn cancelling_after(calls: usize, flag: CancelFlag) -> Self {
        Self {
            cancel_after: Some((calls, flag)),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.chunk_sizes.lock().unwrap().len()
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.chunk_sizes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProductStore for FakeProductStore {
    async fn list_products(&self, filter: ProductFilter) -> RepositoryResult<Vec<ProductRecord>> {
        let stored = self.stored.lock().unwrap();
        Ok(stored
            .iter()
            .filter(|p| !filter.active_only || p.is_active)
            .cloned()
            .collect())
    }

    async fn upsert_products(&self, records: &[ProductRecord]) -> RepositoryResult<usize> {
        let batch_index = {
            let mut sizes = self.chunk_sizes.lock().unwrap();
            sizes.push(records.len());
            sizes.len() - 1
        };

        if let Some((calls, flag)) = &self.cancel_after {
            if batch_index + 1 >= *calls {
                flag.cancel();
            }
        }

        if self.fail_batches.contains(&batch_index) {
            return Err(RepositoryError::DatabaseQueryError(format!(
                "injected failure for batch {}",
                batch_index
            )));
        }

        self.stored.lock().unwrap().extend_from_slice(records);
        Ok(records.len())
    }

    async fn delete_product(&self, id: &str) -> RepositoryResult<()> {
        let mut stored = self.stored.lock().unwrap();
        match stored.iter_mut().find(|p| p.id.as_deref() == Some(id)) {
            Some(product) => {
                product.is_active = false;
                Ok(())
            }
            None => Err(RepositoryError::NotFound {
                entity: "Product".to_string(),
                id: id.to_string(),
            }),
        }
    }
}

// ==========================================
// FakeRequestStore - 统计调用次数，可注入版本冲突
// ==========================================
#[derive(Default)]
pub struct FakeRequestStore {
    records: Mutex<Vec<RequestRecord>>,
    conflicts_remaining: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
}

impl FakeRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置请购单（后插入者视为更新）
    pub fn with_records(records: Vec<RequestRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    /// 接下来 n 次 update_request 返回版本冲突
    pub fn inject_conflicts(&self, n: usize) {
        self.conflicts_remaining.store(n, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<RequestRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn total_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
            + self.create_calls.load(Ordering::SeqCst)
            + self.update_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RequestStore for FakeRequestStore {
    async fn list_requests(&self, filter: RequestFilter) -> RepositoryResult<Vec<RequestRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .rev()
            .filter(|r| !filter.open_only || r.status.is_open())
            .cloned()
            .collect())
    }

    async fn create_request(&self, request: NewRequest) -> RepositoryResult<RequestRecord> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let record = RequestRecord {
            id: uuid::Uuid::new_v4().to_string(),
            customer_name: request.customer_name,
            customer_email: request.customer_email,
            subject: request.subject,
            message: request.message,
            priority: request.priority,
            status: request.status,
            assigned_to: request.assigned_to,
            created_at: now,
            updated_at: now,
            revision: 0,
        };
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update_request(
        &self,
        id: &str,
        patch: RequestPatch,
        expected_revision: i32,
    ) -> RepositoryResult<RequestRecord> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Request".to_string(),
                id: id.to_string(),
            })?;

        let injected = self
            .conflicts_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected || record.revision != expected_revision {
            return Err(RepositoryError::OptimisticLockFailure {
                record_id: id.to_string(),
                expected: expected_revision,
                actual: record.revision,
            });
        }

        if let Some(message) = patch.message {
            record.message = message;
        }
        if let Some(status) = patch.status {
            record.status = status;
        }
        if let Some(priority) = patch.priority {
            record.priority = priority;
        }
        record.updated_at = patch.updated_at;
        record.revision += 1;
        Ok(record.clone())
    }
}
