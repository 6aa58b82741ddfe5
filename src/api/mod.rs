// ==========================================
// 配方可生产性检查 - API 层
// ==========================================
// 职责: 提供应用服务接口,供命令行调用
// ==========================================

pub mod analysis_api;
pub mod error;

// 重导出核心类型
pub use analysis_api::{AnalysisApi, AnalysisRequest, AnalysisResponse};
pub use error::{ApiError, ApiResult};
