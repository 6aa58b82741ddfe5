// ==========================================
// 配方可生产性检查 - 分析编排器
// ==========================================
// 用途: 协调 配方图构建 → 配方解析 → 报表汇总 的执行顺序
// 红线: 一次 run 对应一个 ResolverContext,运行结束即丢弃
// ==========================================

use crate::domain::dataset::AnalysisInput;
use crate::domain::formula::StockSet;
use crate::domain::report::{AnalysisSummary, FeasibilityRow, ReportLabels};
use crate::domain::resolution::ResolverStats;
use crate::engine::batch_reporter::{BatchReporter, DEFAULT_MISSING_SEPARATOR};
use crate::engine::history_graph::HistoryGraphBuilder;
use crate::engine::recipe_resolver::{RecipeResolver, ResolverContext, DEFAULT_MAX_DEPTH};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, instrument};

// ==========================================
// AnalysisSettings - 单次运行参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    pub max_depth: usize,
    pub missing_separator: String,
    pub labels: ReportLabels,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            missing_separator: DEFAULT_MISSING_SEPARATOR.to_string(),
            labels: ReportLabels::default(),
        }
    }
}

// ==========================================
// GraphStats - 配方图规模
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub parents: usize,
    pub batches: usize,
    pub edges: usize,
    pub stock_codes: usize,
}

// ==========================================
// AnalysisOutcome - 分析结果
// ==========================================
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub rows: Vec<FeasibilityRow>,
    pub summary: AnalysisSummary,
    pub resolver_stats: ResolverStats,
    pub graph_stats: GraphStats,
    pub elapsed_ms: u64,
}

// ==========================================
// FeasibilityOrchestrator - 分析编排器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct FeasibilityOrchestrator {
    settings: AnalysisSettings,
}

impl FeasibilityOrchestrator {
    pub fn new(settings: AnalysisSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    /// 执行完整分析（无进度回调）
    pub fn run(&self, input: &AnalysisInput) -> AnalysisOutcome {
        self.run_with_progress(input, |_, _| {})
    }

    /// 执行完整分析
    ///
    /// # 参数
    /// - input: 已清洗的输入数据
    /// - on_progress: 每完成一个目标回调 (已完成, 总数)
    ///
    /// # 返回
    /// 报表行、汇总、解析统计
    #[instrument(skip_all, fields(targets = input.targets.len()))]
    pub fn run_with_progress<F>(&self, input: &AnalysisInput, on_progress: F) -> AnalysisOutcome
    where
        F: FnMut(usize, usize),
    {
        let start = Instant::now();

        // ==========================================
        // 步骤1: 构建历史配方图与库存集合
        // ==========================================
        debug!("步骤1: 构建历史配方图");
        let graph = HistoryGraphBuilder::new().build(&input.history);
        let stock: StockSet = input.stock.iter().map(|s| s.rm_code.clone()).collect();

        let graph_stats = GraphStats {
            parents: graph.parent_count(),
            batches: graph.batch_count(),
            edges: graph.edge_count(),
            stock_codes: stock.len(),
        };
        info!(
            parents = graph_stats.parents,
            batches = graph_stats.batches,
            stock_codes = graph_stats.stock_codes,
            "配方图与库存准备完成"
        );

        // ==========================================
        // 步骤2: 逐目标解析并汇总报表
        // ==========================================
        debug!("步骤2: 逐目标解析");
        let resolver = RecipeResolver::new(&graph, &stock).with_max_depth(self.settings.max_depth);
        let mut ctx = ResolverContext::new();
        let reporter = BatchReporter::new(&input.descriptions)
            .with_labels(self.settings.labels.clone())
            .with_separator(self.settings.missing_separator.clone());

        let rows = reporter.report(&input.targets, &resolver, &mut ctx, on_progress);
        let summary = AnalysisSummary::from_rows(&rows);
        let resolver_stats = ctx.stats().clone();
        let elapsed_ms = start.elapsed().as_millis() as u64;

        info!(
            total = summary.total_targets,
            fully_available = summary.fully_available,
            partially_available = summary.partially_available,
            unavailable = summary.unavailable,
            memo_hits = resolver_stats.memo_hits,
            expansions = resolver_stats.expansions,
            cycles = resolver_stats.cycles_detected,
            depth_limit_hits = resolver_stats.depth_limit_hits,
            elapsed_ms,
            "分析完成"
        );

        AnalysisOutcome {
            rows,
            summary,
            resolver_stats,
            graph_stats,
            elapsed_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::{HistoryRow, StockItem, TargetProduct};

    fn stock_item(code: &str) -> StockItem {
        StockItem {
            rm_code: code.to_string(),
            description: None,
            row_number: 0,
        }
    }

    #[test]
    fn test_run_shares_memo_across_targets() {
        let history = vec![
            HistoryRow::new("RM1", "B1", "INT1"),
            HistoryRow::new("RM2", "B1", "INT1"),
            HistoryRow::new("INT1", "B10", "P1"),
            HistoryRow::new("INT1", "B20", "P2"),
            HistoryRow::new("RM3", "B20", "P2"),
        ];
        let input = AnalysisInput::new(
            vec![TargetProduct::new("P1"), TargetProduct::new("P2")],
            vec![stock_item("RM1"), stock_item("RM2")],
            history,
        );

        let outcome = FeasibilityOrchestrator::default().run(&input);
        assert_eq!(outcome.rows.len(), 2);
        assert_eq!(outcome.rows[0].availability_ratio, 1.0);
        // INT1 只展开一次,第二个目标命中缓存
        assert_eq!(outcome.resolver_stats.expansions, 3);
        assert_eq!(outcome.resolver_stats.memo_hits, 1);
        assert_eq!(outcome.summary.fully_available, 1);
        assert_eq!(outcome.summary.partially_available, 1);
        assert_eq!(outcome.graph_stats.parents, 3);
    }
}
