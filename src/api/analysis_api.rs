// ==========================================
// 配方可生产性检查 - 分析 API
// ==========================================
// 职责: 导入 → 分析 → 记录运行 → 导出报表
// 架构: API 层 → Importer / Engine / Repository / Exporter
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{AnalysisConfigReader, ConfigManager, SUPPORTED_LOCALES};
use crate::db::{configure_sqlite_connection, init_schema};
use crate::domain::dataset::{DatasetPaths, DqReport};
use crate::domain::report::{AnalysisSummary, FeasibilityRow};
use crate::domain::resolution::ResolverStats;
use crate::domain::run::AnalysisRun;
use crate::engine::{AnalysisSettings, FeasibilityOrchestrator, GraphStats};
use crate::exporter::CsvReportExporter;
use crate::i18n;
use crate::importer::{DatasetImporter, DatasetImporterImpl};
use crate::repository::AnalysisRunRepository;
use chrono::Utc;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{info, instrument};
use uuid::Uuid;

// ==========================================
// 请求 / 响应
// ==========================================

/// 单次分析请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub paths: DatasetPaths,
    /// 报表输出路径（None 则不导出）
    pub output: Option<PathBuf>,
    /// 覆盖配置中的报表语言
    pub locale: Option<String>,
    /// 覆盖配置中的最大展开深度
    pub max_depth: Option<usize>,
    /// 是否记录本次运行
    pub save: bool,
}

impl AnalysisRequest {
    pub fn new(paths: DatasetPaths) -> Self {
        Self {
            paths,
            output: None,
            locale: None,
            max_depth: None,
            save: true,
        }
    }
}

/// 单次分析响应
#[derive(Debug, Clone)]
pub struct AnalysisResponse {
    /// 已保存时为运行 ID
    pub run_id: Option<String>,
    pub rows: Vec<FeasibilityRow>,
    pub summary: AnalysisSummary,
    pub dq_report: DqReport,
    pub resolver_stats: ResolverStats,
    pub graph_stats: GraphStats,
    pub output_path: Option<PathBuf>,
    pub elapsed_ms: i64,
}

// ==========================================
// AnalysisApi - 分析 API
// ==========================================
pub struct AnalysisApi {
    config: Arc<ConfigManager>,
    run_repo: Arc<AnalysisRunRepository>,
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

impl AnalysisApi {
    pub fn new(config: Arc<ConfigManager>, run_repo: Arc<AnalysisRunRepository>) -> Self {
        Self { config, run_repo }
    }

    /// 打开数据库（配置与运行记录共享同一连接）
    pub fn open(db_path: &str) -> ApiResult<Self> {
        let conn = Connection::open(db_path)?;
        Self::from_connection(conn)
    }

    /// 内存数据库（测试用）
    pub fn in_memory() -> ApiResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> ApiResult<Self> {
        configure_sqlite_connection(&conn)?;
        init_schema(&conn)?;
        let conn = Arc::new(Mutex::new(conn));

        let config = ConfigManager::from_connection(Arc::clone(&conn))?;
        let run_repo = AnalysisRunRepository::from_connection(conn);
        Ok(Self::new(Arc::new(config), Arc::new(run_repo)))
    }

    pub fn config(&self) -> &ConfigManager {
        &self.config
    }

    /// 合并配置与请求覆盖项,得到本次运行参数
    pub fn resolve_settings(&self, request: &AnalysisRequest) -> ApiResult<AnalysisSettings> {
        let max_depth = match request.max_depth {
            Some(0) => return Err(ApiError::InvalidInput("最大展开深度必须大于 0".to_string())),
            Some(depth) => depth,
            None => self.config.get_max_recursion_depth()?,
        };

        let locale = match &request.locale {
            Some(locale) if !SUPPORTED_LOCALES.contains(&locale.as_str()) => {
                return Err(ApiError::InvalidInput(format!(
                    "不支持的语言: {}（可选 {:?}）",
                    locale, SUPPORTED_LOCALES
                )));
            }
            Some(locale) => locale.clone(),
            None => self.config.get_report_locale()?,
        };

        Ok(AnalysisSettings {
            max_depth,
            missing_separator: self.config.get_missing_separator()?,
            labels: i18n::report_labels(&locale),
        })
    }

    /// 执行一次完整分析
    pub fn run_analysis(&self, request: &AnalysisRequest) -> ApiResult<AnalysisResponse> {
        self.run_analysis_with_progress(request, |_, _| {})
    }

    /// 执行一次完整分析（带进度回调）
    ///
    /// # 流程
    /// 1. 读取配置（列位置、深度、分隔符、语言）
    /// 2. 导入三份输入文件
    /// 3. 解析全部目标
    /// 4. 记录运行（request.save）
    /// 5. 导出 CSV（request.output）
    #[instrument(skip(self, request, on_progress), fields(save = request.save))]
    pub fn run_analysis_with_progress<F>(
        &self,
        request: &AnalysisRequest,
        on_progress: F,
    ) -> ApiResult<AnalysisResponse>
    where
        F: FnMut(usize, usize),
    {
        let started_at = Utc::now();
        let settings = self.resolve_settings(request)?;
        let layout = self.config.get_column_layout()?;

        let input = DatasetImporterImpl::new(layout).import(&request.paths)?;

        let outcome = FeasibilityOrchestrator::new(settings).run_with_progress(&input, on_progress);
        let finished_at = Utc::now();

        let run_id = if request.save {
            let run = AnalysisRun {
                run_id: Uuid::new_v4().to_string(),
                started_at,
                finished_at,
                targets_file: file_label(&request.paths.targets),
                stock_file: file_label(&request.paths.stock),
                history_file: file_label(&request.paths.history),
                summary: outcome.summary.clone(),
                dq_errors: input.dq_report.error_count(),
                dq_warnings: input.dq_report.warning_count(),
                resolver_stats: outcome.resolver_stats.clone(),
                config_snapshot_json: Some(self.config.get_config_snapshot()?),
            };
            let saved = self.run_repo.save_run(&run, &outcome.rows)?;
            info!(run_id = %run.run_id, rows = saved, "分析运行已保存");
            Some(run.run_id)
        } else {
            None
        };

        if let Some(path) = &request.output {
            CsvReportExporter.export(path, &outcome.rows)?;
        }

        Ok(AnalysisResponse {
            run_id,
            rows: outcome.rows,
            summary: outcome.summary,
            dq_report: input.dq_report,
            resolver_stats: outcome.resolver_stats,
            graph_stats: outcome.graph_stats,
            output_path: request.output.clone(),
            elapsed_ms: (finished_at - started_at).num_milliseconds(),
        })
    }

    /// 最近的运行记录
    pub fn list_runs(&self, limit: usize) -> ApiResult<Vec<AnalysisRun>> {
        Ok(self.run_repo.list_recent_runs(limit)?)
    }

    /// 查询单次运行
    pub fn get_run(&self, run_id: &str) -> ApiResult<AnalysisRun> {
        if run_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("运行ID不能为空".to_string()));
        }
        self.run_repo
            .find_run(run_id)?
            .ok_or_else(|| ApiError::NotFound(format!("AnalysisRun(id={})不存在", run_id)))
    }

    /// 读取某次运行的结果行
    pub fn get_run_results(&self, run_id: &str) -> ApiResult<Vec<FeasibilityRow>> {
        Ok(self.run_repo.list_results(run_id)?)
    }

    /// 把历史运行的结果重新导出为 CSV
    pub fn export_run(&self, run_id: &str, output: &Path) -> ApiResult<usize> {
        let rows = self.get_run_results(run_id)?;
        CsvReportExporter.export(output, &rows)?;
        Ok(rows.len())
    }
}
