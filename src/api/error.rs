// ==========================================
// 配方可生产性检查 - API层错误类型
// ==========================================
// 职责: 把各层技术错误转换为用户可读的错误消息
// ==========================================

use crate::config::error::ConfigError;
use crate::exporter::error::ExportError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 导入 / 导出错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("报表导出失败: {0}")]
    ExportError(String),

    // ==========================================
    // 配置 / 数据访问错误
    // ==========================================
    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::DatabaseError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::DatabaseError(format!("外键约束违反: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InternalError(format!("字段{}错误: {}", field, message))
            }
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::FileNotFound(path) => ApiError::NotFound(format!("文件 {}", path)),
            ImportError::UnsupportedFormat(_) | ImportError::InvalidColumn { .. } => {
                ApiError::InvalidInput(err.to_string())
            }
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            other => ApiError::ConfigError(other.to_string()),
        }
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        ApiError::ExportError(err.to_string())
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        ApiError::DatabaseError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_not_found_maps_to_not_found() {
        let err: ApiError = ImportError::FileNotFound("a.csv".to_string()).into();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert!(err.to_string().contains("a.csv"));
    }

    #[test]
    fn test_repository_not_found_message() {
        let err: ApiError = RepositoryError::NotFound {
            entity: "AnalysisRun".to_string(),
            id: "r1".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "资源未找到: AnalysisRun(id=r1)不存在");
    }
}
