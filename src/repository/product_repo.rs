// ==========================================
// 商品目录后台 - 商品数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: products 表的查询 / 按 sku upsert / 软删除
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{Availability, ProductRecord};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::record_store::{ProductFilter, ProductStore};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

const SELECT_COLUMNS: &str = r#"
    id, sku, name, distributor, product_line, category, description,
    wholesale_price, price, cost, override_price, override_end_date,
    release_date, orders_due_date, availability, in_stock, stock_quantity,
    image_url, product_url, approved, is_sample, is_active
"#;

// ==========================================
// ProductRepository - 商品仓储
// ==========================================
pub struct ProductRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductRepository {
    /// 创建新的 ProductRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按 sku 查询（不区分是否启用）
    pub fn find_by_sku(&self, sku: &str) -> RepositoryResult<Option<ProductRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM products WHERE sku = ?1", SELECT_COLUMNS);
        let record = conn
            .query_row(&sql, params![sku], Self::map_row)
            .optional()?;
        Ok(record)
    }

    /// 统计商品数量
    pub fn count_products(&self, active_only: bool) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = if active_only {
            conn.query_row(
                "SELECT COUNT(*) FROM products WHERE is_active = 1",
                [],
                |row| row.get(0),
            )?
        } else {
            conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?
        };
        Ok(count as usize)
    }

    /// 在事务中按 sku upsert
    fn upsert_products_tx(tx: &Transaction, records: &[ProductRecord]) -> RepositoryResult<usize> {
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO products (
                id, sku, name, distributor, product_line, category, description,
                wholesale_price, price, cost, override_price, override_end_date,
                release_date, orders_due_date, availability, in_stock, stock_quantity,
                image_url, product_url, approved, is_sample, is_active,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24
            )
            ON CONFLICT(sku) DO UPDATE SET
                name = excluded.name,
                distributor = excluded.distributor,
                product_line = excluded.product_line,
                category = excluded.category,
                description = excluded.description,
                wholesale_price = excluded.wholesale_price,
                price = excluded.price,
                cost = excluded.cost,
                override_price = excluded.override_price,
                override_end_date = excluded.override_end_date,
                release_date = excluded.release_date,
                orders_due_date = excluded.orders_due_date,
                availability = excluded.availability,
                in_stock = excluded.in_stock,
                stock_quantity = excluded.stock_quantity,
                image_url = excluded.image_url,
                product_url = excluded.product_url,
                approved = excluded.approved,
                is_sample = excluded.is_sample,
                is_active = excluded.is_active,
                updated_at = excluded.updated_at
            "#,
        )?;

        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let mut count = 0;
        for record in records {
            if !record.has_required_fields() {
                return Err(RepositoryError::FieldValueError {
                    field: "sku/name".to_string(),
                    message: format!("必填字段为空: sku='{}'", record.sku),
                });
            }

            let id = record
                .id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string());

            stmt.execute(params![
                id,
                record.sku.trim(),
                record.name.trim(),
                record.distributor,
                record.product_line,
                record.category,
                record.description,
                record.wholesale_price,
                record.price,
                record.cost,
                record.override_price,
                record.override_end_date,
                record.release_date,
                record.orders_due_date,
                record.availability.as_str(),
                record.in_stock,
                record.stock_quantity,
                record.image_url,
                record.product_url,
                record.approved,
                record.is_sample,
                record.is_active,
                now,
                now,
            ])?;
            count += 1;
        }

        Ok(count)
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<ProductRecord> {
        let availability: String = row.get(14)?;
        Ok(ProductRecord {
            id: row.get(0)?,
            sku: row.get(1)?,
            name: row.get(2)?,
            distributor: row.get(3)?,
            product_line: row.get(4)?,
            category: row.get(5)?,
            description: row.get(6)?,
            wholesale_price: row.get(7)?,
            price: row.get(8)?,
            cost: row.get(9)?,
            override_price: row.get(10)?,
            override_end_date: row.get(11)?,
            release_date: row.get(12)?,
            orders_due_date: row.get(13)?,
            availability: Availability::parse_lenient(&availability),
            in_stock: row.get(15)?,
            stock_quantity: row.get(16)?,
            image_url: row.get(17)?,
            product_url: row.get(18)?,
            approved: row.get(19)?,
            is_sample: row.get(20)?,
            is_active: row.get(21)?,
        })
    }
}

#[async_trait]
impl ProductStore for ProductRepository {
    async fn list_products(&self, filter: ProductFilter) -> RepositoryResult<Vec<ProductRecord>> {
        let conn = self.get_conn()?;
        let where_clause = if filter.active_only {
            "WHERE is_active = 1"
        } else {
            ""
        };
        let sql = format!(
            "SELECT {} FROM products {} ORDER BY product_line ASC, name ASC",
            SELECT_COLUMNS, where_clause
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], Self::map_row)?;

        let mut products = Vec::new();
        for row in rows {
            products.push(row?);
        }
        Ok(products)
    }

    async fn upsert_products(&self, records: &[ProductRecord]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let count = Self::upsert_products_tx(&tx, records)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }

    async fn delete_product(&self, id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let affected = conn.execute(
            "UPDATE products SET is_active = 0, updated_at = ?1 WHERE id = ?2",
            params![now, id],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Product".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
