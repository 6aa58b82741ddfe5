// ==========================================
// 配方可生产性检查 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod dataset;
pub mod formula;
pub mod report;
pub mod resolution;
pub mod run;
pub mod types;

// 重导出核心类型
pub use dataset::{
    AnalysisInput, DatasetPaths, DescriptionMap, DqReport, DqSummary, DqViolation, HistoryRow,
    RawHistoryRecord, RawStockRecord, RawTargetRecord, StockItem, TargetProduct,
};
pub use formula::{Batch, HistoryGraph, StockSet};
pub use report::{
    AnalysisSummary, FeasibilityRow, MissingAncestor, MissingDetail, ReportLabels,
};
pub use resolution::{ResolutionResult, ResolverStats};
pub use run::AnalysisRun;
pub use types::{DatasetKind, DqLevel, MissingSource, ProductCode, RecipeOutcome};
