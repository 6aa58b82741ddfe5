// ==========================================
// 配方可生产性检查 - 导入层
// ==========================================
// 职责: 目标清单 / 库存 / 称量历史 三份文件导入
// 支持: Excel (.xlsx/.xls), CSV
// ==========================================

pub mod data_cleaner;
pub mod dataset_importer_impl;
pub mod dataset_importer_trait;
pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;

// 重导出核心类型
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use dataset_importer_impl::DatasetImporterImpl;
pub use dq_validator::DqValidator as DqValidatorImpl;
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper as FieldMapperImpl;
pub use file_parser::{CsvParser, ExcelParser, RawRow, RawSheet, UniversalFileParser};

// 重导出 Trait 接口
pub use dataset_importer_trait::{DataCleaner, DatasetImporter, DqValidator, FieldMapper, FileParser};
