// ==========================================
// 配方可生产性检查 - 导出模块错误类型
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("输出目录不存在: {0}")]
    DirectoryNotFound(String),

    #[error("文件写入失败: {0}")]
    FileWriteError(#[from] std::io::Error),

    #[error("CSV 写入失败: {0}")]
    CsvWriteError(#[from] csv::Error),
}

/// Result 类型别名
pub type ExportResult<T> = Result<T, ExportError>;
