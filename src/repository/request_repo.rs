// ==========================================
// 商品目录后台 - 请购单数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 并发: update_request 以 revision 作条件写入（乐观锁）
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{NewRequest, RequestPatch, RequestPriority, RequestRecord, RequestStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::record_store::{RequestFilter, RequestStore};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

const SELECT_COLUMNS: &str = r#"
    id, customer_name, customer_email, subject, message, priority, status,
    assigned_to, created_at, updated_at, revision
"#;

// ==========================================
// RequestRepository - 请购单仓储
// ==========================================
pub struct RequestRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RequestRepository {
    /// 创建新的 RequestRepository 实例
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

    /// 按 ID 查询
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<RequestRecord>> {
        let conn = self.get_conn()?;
        Self::find_by_id_with(&conn, id)
    }

    fn find_by_id_with(conn: &Connection, id: &str) -> RepositoryResult<Option<RequestRecord>> {
        let sql = format!("SELECT {} FROM requests WHERE id = ?1", SELECT_COLUMNS);
        let record = conn.query_row(&sql, params![id], Self::map_row).optional()?;
        Ok(record)
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<RequestRecord> {
        let priority: String = row.get(5)?;
        let status: String = row.get(6)?;
        let created_at: String = row.get(8)?;
        let updated_at: String = row.get(9)?;

        Ok(RequestRecord {
            id: row.get(0)?,
            customer_name: row.get(1)?,
            customer_email: row.get(2)?,
            subject: row.get(3)?,
            message: row.get(4)?,
            priority: RequestPriority::from_db_str(&priority).unwrap_or_default(),
            status: RequestStatus::from_db_str(&status).unwrap_or_default(),
            assigned_to: row.get(7)?,
            created_at: parse_timestamp(8, &created_at)?,
            updated_at: parse_timestamp(9, &updated_at)?,
            revision: row.get(10)?,
        })
    }
}

fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[async_trait]
impl RequestStore for RequestRepository {
    async fn list_requests(&self, filter: RequestFilter) -> RepositoryResult<Vec<RequestRecord>> {
        let conn = self.get_conn()?;
        let where_clause = if filter.open_only {
            "WHERE status NOT IN ('completed', 'cancelled')"
        } else {
            ""
        };
        // 同一微秒内创建的记录按插入顺序倒排
        let sql = format!(
            "SELECT {} FROM requests {} ORDER BY created_at DESC, rowid DESC",
            SELECT_COLUMNS, where_clause
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], Self::map_row)?;

        let mut requests = Vec::new();
        for row in rows {
            requests.push(row?);
        }
        Ok(requests)
    }

    async fn create_request(&self, request: NewRequest) -> RepositoryResult<RequestRecord> {
        let conn = self.get_conn()?;
        let now = Utc::now();
        let record = RequestRecord {
            id: Uuid::new_v4().to_string(),
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

        conn.execute(
            r#"
            INSERT INTO requests (
                id, customer_name, customer_email, subject, message, priority, status,
                assigned_to, created_at, updated_at, revision
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                record.id,
                record.customer_name,
                record.customer_email,
                record.subject,
                record.message,
                record.priority.as_str(),
                record.status.as_str(),
                record.assigned_to,
                format_timestamp(&record.created_at),
                format_timestamp(&record.updated_at),
                record.revision,
            ],
        )?;

        Ok(record)
    }

    async fn update_request(
        &self,
        id: &str,
        patch: RequestPatch,
        expected_revision: i32,
    ) -> RepositoryResult<RequestRecord> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE requests SET
                message = COALESCE(?1, message),
                status = COALESCE(?2, status),
                priority = COALESCE(?3, priority),
                updated_at = ?4,
                revision = revision + 1
            WHERE id = ?5 AND revision = ?6
            "#,
            params![
                patch.message,
                patch.status.map(|s| s.as_str()),
                patch.priority.map(|p| p.as_str()),
                format_timestamp(&patch.updated_at),
                id,
                expected_revision,
            ],
        )?;

        if affected == 0 {
            let actual: Option<i32> = conn
                .query_row(
                    "SELECT revision FROM requests WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .optional()?;

            return Err(match actual {
                Some(actual) => RepositoryError::OptimisticLockFailure {
                    record_id: id.to_string(),
                    expected: expected_revision,
                    actual,
                },
                None => RepositoryError::NotFound {
                    entity: "Request".to_string(),
                    id: id.to_string(),
                },
            });
        }

        Self::find_by_id_with(&conn, id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "Request".to_string(),
            id: id.to_string(),
        })
    }
}
