// ==========================================
// 配方可生产性检查 - 配方解析结果
// ==========================================
// 职责: 单个物料的展开原料集合、选中批次、齐套率、缺料来源
// ==========================================

use crate::domain::formula::StockSet;
use crate::domain::types::{MissingSource, ProductCode, RecipeOutcome};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

static DIRECT_SOURCE: MissingSource = MissingSource::Direct;

// ==========================================
// ResolverStats - 解析运行统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverStats {
    pub memo_hits: u64,
    pub expansions: u64,       // 实际展开的可生产物料数
    pub leaves: u64,           // 首次解析的原料叶子数
    pub cycles_detected: u64,
    pub depth_limit_hits: u64,
    pub max_depth_reached: usize,
}

/// 配方解析结果
///
/// `exploded` 与 `missing` 使用有序容器,保证报表输出稳定。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    /// 最终需要的原料集合（集合语义,同一原料只计一次）
    pub exploded: BTreeSet<ProductCode>,
    /// 选中的批次或终止原因
    pub outcome: RecipeOutcome,
    /// 齐套率 0.0 ~ 1.0
    pub availability_ratio: f64,
    /// 缺料 → 最近引入它的祖先（相对于结果所属物料）
    pub missing: BTreeMap<ProductCode, MissingSource>,
}

impl ResolutionResult {
    /// 原料叶子: 在库为 1.0,否则 0.0（不走通用公式）
    pub fn raw_material(code: &str, in_stock: bool) -> Self {
        let mut missing = BTreeMap::new();
        if !in_stock {
            missing.insert(code.to_string(), MissingSource::Direct);
        }
        Self {
            exploded: BTreeSet::from([code.to_string()]),
            outcome: RecipeOutcome::RawMaterial,
            availability_ratio: if in_stock { 1.0 } else { 0.0 },
            missing,
        }
    }

    pub fn circular_reference() -> Self {
        Self::empty(RecipeOutcome::CircularReference)
    }

    /// 超过最大展开深度: 被截断的物料自身视为缺失
    pub fn depth_limit_exceeded(code: &str) -> Self {
        Self {
            exploded: BTreeSet::from([code.to_string()]),
            outcome: RecipeOutcome::DepthLimitExceeded,
            availability_ratio: 0.0,
            missing: BTreeMap::from([(code.to_string(), MissingSource::Direct)]),
        }
    }

    /// 父项没有任何批次: 自身视为完全缺失
    pub fn no_valid_recipe(code: &str) -> Self {
        Self {
            exploded: BTreeSet::from([code.to_string()]),
            outcome: RecipeOutcome::NoValidRecipe,
            availability_ratio: 0.0,
            missing: BTreeMap::from([(code.to_string(), MissingSource::Direct)]),
        }
    }

    /// 由某个批次的展开结果构建（齐套率按通用公式计算）
    pub fn from_batch(
        batch_id: &str,
        exploded: BTreeSet<ProductCode>,
        missing: BTreeMap<ProductCode, MissingSource>,
        stock: &StockSet,
    ) -> Self {
        let availability_ratio = availability_ratio(&exploded, stock);
        Self {
            exploded,
            outcome: RecipeOutcome::Batch(batch_id.to_string()),
            availability_ratio,
            missing,
        }
    }

    fn empty(outcome: RecipeOutcome) -> Self {
        Self {
            exploded: BTreeSet::new(),
            outcome,
            availability_ratio: 0.0,
            missing: BTreeMap::new(),
        }
    }

    pub fn ingredient_count(&self) -> usize {
        self.exploded.len()
    }

    /// 展开集合中在库的原料
    pub fn available<'a>(&'a self, stock: &'a StockSet) -> impl Iterator<Item = &'a ProductCode> {
        self.exploded.iter().filter(move |code| stock.contains(code))
    }

    /// 展开集合中缺失的原料（按编码排序）
    pub fn unavailable<'a>(
        &'a self,
        stock: &'a StockSet,
    ) -> impl Iterator<Item = &'a ProductCode> {
        self.exploded.iter().filter(move |code| !stock.contains(code))
    }

    /// 缺料来源,未记录时按 Direct 处理
    pub fn source_of(&self, code: &str) -> &MissingSource {
        self.missing.get(code).unwrap_or(&DIRECT_SOURCE)
    }

    /// 选优规则: 齐套率优先,齐套率相同时展开集合更大者胜出
    pub fn is_better_than(&self, other: &ResolutionResult) -> bool {
        self.availability_ratio > other.availability_ratio
            || (self.availability_ratio == other.availability_ratio
                && self.exploded.len() > other.exploded.len())
    }
}

/// `|exploded ∩ stock| / |exploded|`,空集合为 0.0
pub fn availability_ratio(exploded: &BTreeSet<ProductCode>, stock: &StockSet) -> f64 {
    if exploded.is_empty() {
        return 0.0;
    }
    let available = exploded.iter().filter(|code| stock.contains(code)).count();
    available as f64 / exploded.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(codes: &[&str]) -> BTreeSet<ProductCode> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_raw_material_in_stock() {
        let r = ResolutionResult::raw_material("RM1", true);
        assert_eq!(r.exploded, set(&["RM1"]));
        assert_eq!(r.availability_ratio, 1.0);
        assert!(r.missing.is_empty());
    }

    #[test]
    fn test_raw_material_missing() {
        let r = ResolutionResult::raw_material("RM1", false);
        assert_eq!(r.availability_ratio, 0.0);
        assert_eq!(r.missing.get("RM1"), Some(&MissingSource::Direct));
    }

    #[test]
    fn test_availability_ratio_empty_is_zero() {
        let stock: StockSet = vec!["RM1"].into_iter().collect();
        assert_eq!(availability_ratio(&BTreeSet::new(), &stock), 0.0);
        assert_eq!(availability_ratio(&set(&["RM1", "RM2"]), &stock), 0.5);
    }

    #[test]
    fn test_is_better_than() {
        let stock: StockSet = vec!["RM1", "RM2"].into_iter().collect();
        let small = ResolutionResult::from_batch("B1", set(&["RM1"]), BTreeMap::new(), &stock);
        let large =
            ResolutionResult::from_batch("B2", set(&["RM1", "RM2"]), BTreeMap::new(), &stock);
        let partial =
            ResolutionResult::from_batch("B3", set(&["RM1", "RM3"]), BTreeMap::new(), &stock);

        assert!(large.is_better_than(&small));
        assert!(!small.is_better_than(&large));
        assert!(small.is_better_than(&partial));
        // 完全相同不替换
        assert!(!small.is_better_than(&small.clone()));
    }
}
