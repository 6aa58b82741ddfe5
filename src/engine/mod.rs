// ==========================================
// 配方可生产性检查 - 引擎层
// ==========================================
// 职责: 配方图构建、递归解析、报表汇总
// 红线: 引擎不做 IO,不拼 SQL,解析器不返回错误
// ==========================================

pub mod batch_reporter;
pub mod history_graph;
pub mod orchestrator;
pub mod recipe_resolver;

// 重导出核心引擎
pub use batch_reporter::{BatchReporter, DEFAULT_MISSING_SEPARATOR};
pub use history_graph::HistoryGraphBuilder;
pub use orchestrator::{AnalysisOutcome, AnalysisSettings, FeasibilityOrchestrator, GraphStats};
pub use recipe_resolver::{RecipeResolver, ResolverContext, DEFAULT_MAX_DEPTH};
