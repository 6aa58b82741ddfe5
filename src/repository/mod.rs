// ==========================================
// 配方可生产性检查 - 数据仓储层
// ==========================================
// 职责: 分析运行历史的持久化
// 红线: Repository 不含业务逻辑
// ==========================================

pub mod analysis_run_repo;
pub mod error;

pub use analysis_run_repo::AnalysisRunRepository;
pub use error::{RepositoryError, RepositoryResult};
