// ==========================================
// 配方可生产性检查 - 分析运行记录
// ==========================================
// 对齐: analysis_run 表
// ==========================================

use crate::domain::report::AnalysisSummary;
use crate::domain::resolution::ResolverStats;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRun {
    pub run_id: String, // UUID v4
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub targets_file: String,
    pub stock_file: String,
    pub history_file: String,
    pub summary: AnalysisSummary,
    pub dq_errors: usize,
    pub dq_warnings: usize,
    pub resolver_stats: ResolverStats,
    pub config_snapshot_json: Option<String>,
}

impl AnalysisRun {
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
