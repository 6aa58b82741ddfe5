// ==========================================
// 配方可生产性检查 - 核心库
// ==========================================
// 用途: 基于历史称量记录还原 BOM,判断目标成品能否用现有库存生产
// 技术栈: Rust + SQLite
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 配方图、解析器、报表汇总
pub mod engine;

// 导入层 - 三份输入文件
pub mod importer;

// 配置层 - config_kv
pub mod config;

// 数据仓储层 - 运行历史
pub mod repository;

// 导出层 - CSV 报表
pub mod exporter;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 应用服务
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{DatasetKind, DqLevel, MissingSource, ProductCode, RecipeOutcome};

// 领域实体
pub use domain::{
    AnalysisInput, AnalysisRun, AnalysisSummary, Batch, DatasetPaths, DescriptionMap, DqReport,
    FeasibilityRow, HistoryGraph, HistoryRow, ReportLabels, ResolutionResult, ResolverStats,
    StockItem, StockSet, TargetProduct,
};

// 引擎
pub use engine::{
    AnalysisOutcome, AnalysisSettings, BatchReporter, FeasibilityOrchestrator,
    HistoryGraphBuilder, RecipeResolver, ResolverContext,
};

// API
pub use api::{AnalysisApi, AnalysisRequest, AnalysisResponse, ApiError, ApiResult};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "配方可生产性检查";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
