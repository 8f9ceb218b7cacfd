// ==========================================
// 商品目录后台 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value + scope，仅使用 global)
// 原则: 缺失或格式错误的配置回落默认值并告警
// ==========================================

use crate::config::interchange_config_trait::InterchangeConfigReader;
use crate::db::open_sqlite_connection;
use crate::domain::ImportMode;
use crate::engine::DEFAULT_MAX_MERGE_ATTEMPTS;
use crate::exporter::DEFAULT_FILE_PREFIX;
use crate::importer::DEFAULT_BATCH_SIZE;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::warn;

/// 配置键
pub mod config_keys {
    pub const IMPORT_BATCH_SIZE: &str = "import.batch_size";
    pub const IMPORT_DEFAULT_MODE: &str = "import.default_mode";
    pub const EXPORT_FILE_PREFIX: &str = "export.file_prefix";
    pub const REQUEST_MAX_MERGE_ATTEMPTS: &str = "request.max_merge_attempts";
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置读取失败: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("配置锁获取失败: {0}")]
    LockError(String),

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },

    #[error("配置快照序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> ConfigResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    pub fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（已知键会先校验）
    pub fn set_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        validate_value(key, value)?;

        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取所有配置的快照（JSON，键有序）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    fn get_parsed<T: std::str::FromStr>(&self, key: &str, default: T) -> ConfigResult<T> {
        let Some(raw) = self.get_config_value(key)? else {
            return Ok(default);
        };
        match raw.trim().parse::<T>() {
            Ok(value) => Ok(value),
            Err(_) => {
                warn!(config_key = key, raw_value = %raw, "配置值格式错误，使用默认值");
                Ok(default)
            }
        }
    }
}

fn validate_value(key: &str, value: &str) -> ConfigResult<()> {
    let invalid = |message: &str| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        message: message.to_string(),
    };

    match key {
        config_keys::IMPORT_BATCH_SIZE | config_keys::REQUEST_MAX_MERGE_ATTEMPTS => {
            match value.trim().parse::<usize>() {
                Ok(n) if n >= 1 => Ok(()),
                _ => Err(invalid("必须为 >= 1 的整数")),
            }
        }
        config_keys::IMPORT_DEFAULT_MODE => ImportMode::from_db_str(value)
            .map(|_| ())
            .ok_or_else(|| invalid("必须为 header 或 positional")),
        config_keys::EXPORT_FILE_PREFIX => {
            if value.trim().is_empty() {
                Err(invalid("不能为空"))
            } else {
                Ok(())
            }
        }
        _ => Ok(()),
    }
}

// ==========================================
// InterchangeConfigReader Trait 实现
// ==========================================
#[async_trait]
impl InterchangeConfigReader for ConfigManager {
    async fn get_import_batch_size(&self) -> ConfigResult<usize> {
        let size = self.get_parsed(config_keys::IMPORT_BATCH_SIZE, DEFAULT_BATCH_SIZE)?;
        Ok(if size == 0 { DEFAULT_BATCH_SIZE } else { size })
    }

    async fn get_default_import_mode(&self) -> ConfigResult<ImportMode> {
        let value = self.get_config_value(config_keys::IMPORT_DEFAULT_MODE)?;
        Ok(value
            .as_deref()
            .and_then(ImportMode::from_db_str)
            .unwrap_or_default())
    }

    async fn get_export_file_prefix(&self) -> ConfigResult<String> {
        let value = self.get_config_value(config_keys::EXPORT_FILE_PREFIX)?;
        Ok(value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_FILE_PREFIX.to_string()))
    }

    async fn get_max_merge_attempts(&self) -> ConfigResult<usize> {
        let attempts =
            self.get_parsed(config_keys::REQUEST_MAX_MERGE_ATTEMPTS, DEFAULT_MAX_MERGE_ATTEMPTS)?;
        Ok(attempts.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[tokio::test]
    async fn test_defaults_when_unset() {
        let config = manager();
        assert_eq!(config.get_import_batch_size().await.unwrap(), 50);
        assert_eq!(config.get_default_import_mode().await.unwrap(), ImportMode::Header);
        assert_eq!(config.get_export_file_prefix().await.unwrap(), "products_export");
        assert_eq!(config.get_max_merge_attempts().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_set_and_read_back() {
        let config = manager();
        config.set_config_value(config_keys::IMPORT_BATCH_SIZE, "20").unwrap();
        config
            .set_config_value(config_keys::IMPORT_DEFAULT_MODE, "positional")
            .unwrap();

        assert_eq!(config.get_import_batch_size().await.unwrap(), 20);
        assert_eq!(
            config.get_default_import_mode().await.unwrap(),
            ImportMode::Positional
        );

        let snapshot: BTreeMap<String, String> =
            serde_json::from_str(&config.get_config_snapshot().unwrap()).unwrap();
        assert_eq!(snapshot.get("import.batch_size"), Some(&"20".to_string()));
    }

    #[test]
    fn test_rejects_invalid_values() {
        let config = manager();
        assert!(matches!(
            config.set_config_value(config_keys::IMPORT_BATCH_SIZE, "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(config
            .set_config_value(config_keys::IMPORT_DEFAULT_MODE, "xml")
            .is_err());
    }
}
