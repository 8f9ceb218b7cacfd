// ==========================================
// 商品目录后台 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 并发控制错误 =====
    #[error("乐观锁冲突: record_id={record_id}, expected_revision={expected}, actual_revision={actual}")]
    OptimisticLockFailure {
        record_id: String,
        expected: i32,
        actual: i32,
    },

    // ===== 数据库错误 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    #[error("唯一约束违反: {0}")]
    UniqueConstraintViolation(String),

    // ===== 数据质量错误 =====
    #[error("字段值错误 (field={field}): {message}")]
    FieldValueError { field: String, message: String },
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            // products/requests 表的 CHECK 约束: 价格非负、枚举列取值
            rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("CHECK constraint") => {
                RepositoryError::FieldValueError {
                    field: check_constraint_field(&msg),
                    message: msg,
                }
            }
            rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("UNIQUE") => {
                RepositoryError::UniqueConstraintViolation(msg)
            }
            rusqlite::Error::SqliteFailure(_, Some(msg)) => RepositoryError::DatabaseQueryError(msg),
            rusqlite::Error::SqliteFailure(ref code, None)
                if code.code == rusqlite::ErrorCode::DatabaseBusy =>
            {
                RepositoryError::LockError(err.to_string())
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// 从 SQLite 的 CHECK 失败消息中取出列名（取不到时返回 "unknown"）
fn check_constraint_field(msg: &str) -> String {
    ["wholesale_price", "availability", "priority", "status"]
        .iter()
        .find(|column| msg.contains(*column))
        .map(|column| column.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}


/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
