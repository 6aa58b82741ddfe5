// ==========================================
// 配方可生产性检查 - 批量报表生成器
// ==========================================
// 职责: 对目标清单逐个调用配方解析器,汇总成报表行
// 红线: 整个目标清单共享同一个 ResolverContext（中间半成品只解析一次）
// ==========================================

use crate::domain::dataset::{DescriptionMap, TargetProduct};
use crate::domain::formula::StockSet;
use crate::domain::report::{FeasibilityRow, MissingAncestor, MissingDetail, ReportLabels};
use crate::domain::resolution::ResolutionResult;
use crate::engine::recipe_resolver::{RecipeResolver, ResolverContext};
use tracing::debug;

/// 缺料清单默认分隔符
pub const DEFAULT_MISSING_SEPARATOR: &str = ";";

/// BatchReporter - 批量报表生成器
pub struct BatchReporter<'a> {
    descriptions: &'a DescriptionMap,
    labels: ReportLabels,
    separator: String,
}

impl<'a> BatchReporter<'a> {
    pub fn new(descriptions: &'a DescriptionMap) -> Self {
        Self {
            descriptions,
            labels: ReportLabels::default(),
            separator: DEFAULT_MISSING_SEPARATOR.to_string(),
        }
    }

    pub fn with_labels(mut self, labels: ReportLabels) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// 生成全部目标的报表行
    ///
    /// # 参数
    /// - targets: 目标成品清单（保持输入顺序）
    /// - resolver: 配方解析器
    /// - ctx: 本次运行共享的解析状态
    /// - on_progress: 每处理完一个目标回调 (已完成, 总数)
    pub fn report<F>(
        &self,
        targets: &[TargetProduct],
        resolver: &RecipeResolver<'_>,
        ctx: &mut ResolverContext,
        mut on_progress: F,
    ) -> Vec<FeasibilityRow>
    where
        F: FnMut(usize, usize),
    {
        let total = targets.len();
        let mut rows = Vec::with_capacity(total);

        for (idx, target) in targets.iter().enumerate() {
            let result = resolver.resolve(&target.product_code, ctx);
            let row = self.build_row(target, &result, resolver.stock());
            debug!(
                product_code = %row.product_code,
                formula = %row.formula_used,
                ratio = row.availability_ratio,
                missing = row.missing_count,
                "目标解析完成"
            );
            rows.push(row);
            on_progress(idx + 1, total);
        }

        rows
    }

    /// 由解析结果构建单行报表
    pub fn build_row(
        &self,
        target: &TargetProduct,
        result: &ResolutionResult,
        stock: &StockSet,
    ) -> FeasibilityRow {
        let available_count = result.available(stock).count();
        let missing_details: Vec<MissingDetail> = result
            .unavailable(stock)
            .map(|code| self.missing_detail(&target.product_code, result, code))
            .collect();

        let missing_list = missing_details
            .iter()
            .map(|d| d.render(&self.labels.via))
            .collect::<Vec<_>>()
            .join(&self.separator);

        FeasibilityRow {
            product_code: target.product_code.clone(),
            description: target.description.clone(),
            yearly_qty: target.yearly_qty,
            three_month_qty: target.three_month_qty,
            outcome: result.outcome.clone(),
            formula_used: self.labels.formula_used(&result.outcome),
            ingredient_count: result.ingredient_count(),
            available_count,
            availability_ratio: result.availability_ratio,
            missing_count: missing_details.len(),
            missing_details,
            missing_list,
        }
    }

    fn missing_detail(&self, target_code: &str, result: &ResolutionResult, code: &str) -> MissingDetail {
        let ancestor = result.source_of(code).ancestor(target_code);
        let via = if ancestor == target_code {
            None
        } else {
            Some(MissingAncestor {
                code: ancestor.to_string(),
                description: self
                    .descriptions
                    .get(ancestor)
                    .unwrap_or(self.labels.unknown_intermediate.as_str())
                    .to_string(),
            })
        };

        MissingDetail {
            code: code.to_string(),
            description: self
                .descriptions
                .get(code)
                .unwrap_or(self.labels.unknown.as_str())
                .to_string(),
            via,
        }
    }
}
