// ==========================================
// 配方可生产性检查 - 配方解析器
// ==========================================
// 职责: 把物料递归展开到原料叶子,在多个历史批次中选出齐套率最高者
// 优先级: 缓存命中 -> 循环引用 -> 原料叶子 -> 深度保护 -> 逐批次展开
// 选优: 齐套率高者胜;齐套率相同,展开集合更大者胜;再相同保留先评估者
// 红线: 解析器永不返回错误,所有异常情况都是结果数据
// ==========================================

use crate::domain::formula::{Batch, HistoryGraph, StockSet};
use crate::domain::resolution::{ResolutionResult, ResolverStats};
use crate::domain::types::{MissingSource, ProductCode};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// 默认最大展开深度
pub const DEFAULT_MAX_DEPTH: usize = 256;

// ==========================================
// ResolverContext - 单次分析运行的解析状态
// ==========================================
// memo: 整个运行期有效,只增不删
// path: 当前调用链上正在展开的物料,仅用于循环检测
// truncated: 当前展开分支内是否触发过深度保护
// 不同库存/历史快照的运行之间不可复用
#[derive(Debug, Default)]
pub struct ResolverContext {
    memo: HashMap<ProductCode, Arc<ResolutionResult>>,
    path: HashSet<ProductCode>,
    depth: usize,
    truncated: bool,
    stats: ResolverStats,
}

impl ResolverContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已缓存的解析结果
    pub fn cached(&self, code: &str) -> Option<&Arc<ResolutionResult>> {
        self.memo.get(code)
    }

    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }

    /// 当前是否有物料处于展开中（调用结束后必为 false）
    pub fn is_expanding(&self) -> bool {
        !self.path.is_empty()
    }

    pub fn stats(&self) -> &ResolverStats {
        &self.stats
    }

    // 依赖调用链的结果,以及展开中被深度截断的结果,都不进入缓存
    fn remember(&mut self, code: &str, result: &Arc<ResolutionResult>, truncated: bool) {
        if truncated || result.outcome.is_path_dependent() {
            return;
        }
        self.memo.insert(code.to_string(), Arc::clone(result));
    }
}

// ==========================================
// RecipeResolver - 配方解析器
// ==========================================
pub struct RecipeResolver<'a> {
    graph: &'a HistoryGraph,
    stock: &'a StockSet,
    max_depth: usize,
}

impl<'a> RecipeResolver<'a> {
    pub fn new(graph: &'a HistoryGraph, stock: &'a StockSet) -> Self {
        Self {
            graph,
            stock,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// 设置最大展开深度（至少为 1）
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    pub fn stock(&self) -> &StockSet {
        self.stock
    }

    /// 解析单个物料
    ///
    /// # 参数
    /// - code: 物料编码
    /// - ctx: 本次运行的解析状态（缓存 + 展开路径）
    ///
    /// # 返回
    /// 解析结果（缓存命中时与缓存共享同一份数据）
    ///
    /// # 缓存规则
    /// - 原料叶子、批次结果、无有效配方: 写入缓存
    /// - 循环引用、超深度: 依赖调用链,不写入缓存
    /// - 展开过程中任一分支超深度: 该物料及其祖先都不写入缓存
    pub fn resolve(&self, code: &str, ctx: &mut ResolverContext) -> Arc<ResolutionResult> {
        // 1) 缓存命中
        if let Some(hit) = ctx.memo.get(code) {
            ctx.stats.memo_hits += 1;
            return Arc::clone(hit);
        }

        // 2) 循环引用
        if ctx.path.contains(code) {
            ctx.stats.cycles_detected += 1;
            debug!(code = %code, depth = ctx.depth, "检测到循环引用,截断该分支");
            return Arc::new(ResolutionResult::circular_reference());
        }

        // 3) 原料叶子
        let batches = match self.graph.batches(code) {
            Some(batches) => batches,
            None => {
                ctx.stats.leaves += 1;
                let leaf = Arc::new(ResolutionResult::raw_material(
                    code,
                    self.stock.contains(code),
                ));
                ctx.remember(code, &leaf, false);
                return leaf;
            }
        };

        // 4) 深度保护
        if ctx.depth >= self.max_depth {
            ctx.stats.depth_limit_hits += 1;
            ctx.truncated = true;
            warn!(
                code = %code,
                max_depth = self.max_depth,
                "配方展开超过最大深度,截断该分支"
            );
            return Arc::new(ResolutionResult::depth_limit_exceeded(code));
        }

        // 5) 逐批次展开
        let outer_truncated = std::mem::replace(&mut ctx.truncated, false);
        ctx.path.insert(code.to_string());
        ctx.depth += 1;
        ctx.stats.expansions += 1;
        ctx.stats.max_depth_reached = ctx.stats.max_depth_reached.max(ctx.depth);

        let mut best: Option<ResolutionResult> = None;
        for batch in batches {
            let candidate = self.explode_batch(batch, ctx);
            trace!(
                code = %code,
                batch_id = %batch.batch_id,
                ratio = candidate.availability_ratio,
                size = candidate.exploded.len(),
                "批次评估"
            );
            let is_better = best
                .as_ref()
                .map_or(true, |current| candidate.is_better_than(current));
            if is_better {
                best = Some(candidate);
            }
        }

        ctx.depth -= 1;
        ctx.path.remove(code);
        let truncated = ctx.truncated;
        ctx.truncated = outer_truncated || truncated;

        let result = Arc::new(best.unwrap_or_else(|| {
            debug!(code = %code, "父项无任何历史批次,按无有效配方处理");
            ResolutionResult::no_valid_recipe(code)
        }));
        ctx.remember(code, &result, truncated);
        result
    }

    /// 展开单个批次: 合并各原料的展开集合与缺料来源
    ///
    /// 缺料来源合并规则（相对于当前父项）:
    /// - 子结果为 Direct 且缺料就是该原料本身 → Direct（父项的直接原料）
    /// - 子结果为 Direct 但缺料来自原料内部 → Via(原料)（缺口在该半成品层引入）
    /// - 子结果为 Via(X) → 保持更深层的归属
    fn explode_batch(&self, batch: &Batch, ctx: &mut ResolverContext) -> ResolutionResult {
        let mut exploded: BTreeSet<ProductCode> = BTreeSet::new();
        let mut missing: BTreeMap<ProductCode, MissingSource> = BTreeMap::new();

        for ingredient in &batch.ingredients {
            let child = self.resolve(ingredient, ctx);
            exploded.extend(child.exploded.iter().cloned());

            for (missing_code, source) in &child.missing {
                let source = match source {
                    MissingSource::Direct if missing_code == ingredient => MissingSource::Direct,
                    MissingSource::Direct => MissingSource::Via(ingredient.clone()),
                    deeper @ MissingSource::Via(_) => deeper.clone(),
                };
                missing.insert(missing_code.clone(), source);
            }
        }

        ResolutionResult::from_batch(&batch.batch_id, exploded, missing, self.stock)
    }
}
