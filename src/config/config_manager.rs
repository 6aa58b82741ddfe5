// ==========================================
// 配方可生产性检查 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (scope_id = 'global')
// ==========================================

use crate::config::analysis_config_trait::AnalysisConfigReader;
use crate::config::column_layout::ColumnLayout;
use crate::config::error::{ConfigError, ConfigResult};
use crate::db::{configure_sqlite_connection, init_schema, open_sqlite_connection};
use crate::engine::{DEFAULT_MAX_DEPTH, DEFAULT_MISSING_SEPARATOR};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// 支持的报表语言
pub const SUPPORTED_LOCALES: &[&str] = &["en", "zh-CN"];

/// 默认报表语言
pub const DEFAULT_LOCALE: &str = "en";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 打开数据库文件并确保表结构存在
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：对传入连接再次应用统一 PRAGMA 与建表（幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ConfigError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
            init_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    /// 内存数据库（测试用）
    pub fn in_memory() -> ConfigResult<Self> {
        Self::from_connection(Arc::new(Mutex::new(Connection::open_in_memory()?)))
    }

    fn lock(&self) -> ConfigResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        debug!(key = %key, value = %value, "配置已更新");
        Ok(())
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 获取所有 global 配置的快照（JSON,键有序）
    ///
    /// 用途: 随分析运行一同记录,便于追溯结果对应的配置
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&config_map)?)
    }
}

fn invalid(key: &str, value: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        message: message.into(),
    }
}

impl AnalysisConfigReader for ConfigManager {
    fn get_max_recursion_depth(&self) -> ConfigResult<usize> {
        let key = config_keys::MAX_RECURSION_DEPTH;
        match self.get_global_config_value(key)? {
            None => Ok(DEFAULT_MAX_DEPTH),
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(depth) if depth >= 1 => Ok(depth),
                _ => Err(invalid(key, &raw, "需要不小于 1 的整数")),
            },
        }
    }

    fn get_column_layout(&self) -> ConfigResult<ColumnLayout> {
        match self.get_global_config_value(config_keys::COLUMN_LAYOUT)? {
            None => Ok(ColumnLayout::default()),
            Some(raw) => Ok(serde_json::from_str(&raw)?),
        }
    }

    fn get_missing_separator(&self) -> ConfigResult<String> {
        let value =
            self.get_config_or_default(config_keys::MISSING_SEPARATOR, DEFAULT_MISSING_SEPARATOR)?;
        if value.is_empty() {
            return Err(invalid(config_keys::MISSING_SEPARATOR, &value, "分隔符不能为空"));
        }
        Ok(value)
    }

    fn get_report_locale(&self) -> ConfigResult<String> {
        let value = self.get_config_or_default(config_keys::REPORT_LOCALE, DEFAULT_LOCALE)?;
        let value = value.trim().to_string();
        if !SUPPORTED_LOCALES.contains(&value.as_str()) {
            return Err(invalid(
                config_keys::REPORT_LOCALE,
                &value,
                format!("仅支持 {:?}", SUPPORTED_LOCALES),
            ));
        }
        Ok(value)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 解析
    pub const MAX_RECURSION_DEPTH: &str = "analysis/max_recursion_depth";

    // 导入
    pub const COLUMN_LAYOUT: &str = "import/column_layout"; // JSON

    // 报表
    pub const MISSING_SEPARATOR: &str = "report/missing_separator";
    pub const REPORT_LOCALE: &str = "report/locale";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_missing() {
        let config = ConfigManager::in_memory().unwrap();
        assert_eq!(config.get_max_recursion_depth().unwrap(), 256);
        assert_eq!(config.get_missing_separator().unwrap(), ";");
        assert_eq!(config.get_report_locale().unwrap(), "en");
        assert_eq!(config.get_column_layout().unwrap(), ColumnLayout::default());
    }

    #[test]
    fn test_upsert_overrides() {
        let config = ConfigManager::in_memory().unwrap();
        config.set_config_value(config_keys::MAX_RECURSION_DEPTH, "64").unwrap();
        config.set_config_value(config_keys::MAX_RECURSION_DEPTH, "32").unwrap();
        assert_eq!(config.get_max_recursion_depth().unwrap(), 32);
    }

    #[test]
    fn test_invalid_depth_rejected() {
        let config = ConfigManager::in_memory().unwrap();
        config.set_config_value(config_keys::MAX_RECURSION_DEPTH, "0").unwrap();
        assert!(matches!(
            config.get_max_recursion_depth(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_snapshot_is_sorted_json() {
        let config = ConfigManager::in_memory().unwrap();
        config.set_config_value(config_keys::REPORT_LOCALE, "zh-CN").unwrap();
        config.set_config_value(config_keys::MISSING_SEPARATOR, " | ").unwrap();

        let snapshot = config.get_config_snapshot().unwrap();
        assert_eq!(
            snapshot,
            r#"{"report/locale":"zh-CN","report/missing_separator":" | "}"#
        );
    }
}
