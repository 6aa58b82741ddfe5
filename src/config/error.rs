// ==========================================
// 配方可生产性检查 - 配置层错误类型
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("配置读写失败: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("配置值无效 (key: {key}, value: {value}): {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },

    #[error("配置 JSON 解析失败: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
