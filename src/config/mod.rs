// ==========================================
// 配方可生产性检查 - 配置层
// ==========================================
// 职责: 分析参数、导入列位置、报表文案设置
// 存储: config_kv 表
// ==========================================

pub mod analysis_config_trait;
pub mod column_layout;
pub mod config_manager;
pub mod error;

// 重导出核心配置管理器
pub use analysis_config_trait::AnalysisConfigReader;
pub use column_layout::{ColumnLayout, HistoryColumns, StockColumns, TargetColumns};
pub use config_manager::{config_keys, ConfigManager, DEFAULT_LOCALE, SUPPORTED_LOCALES};
pub use error::{ConfigError, ConfigResult};
