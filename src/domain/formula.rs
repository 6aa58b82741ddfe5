// ==========================================
// 配方可生产性检查 - 配方图领域模型
// ==========================================
// 职责: 历史批次 (Batch)、历史配方图 (HistoryGraph)、库存集合 (StockSet)
// 红线: 一次分析运行内三者均不可变
// ==========================================

use crate::domain::types::ProductCode;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ==========================================
// Batch - 历史批次
// ==========================================
// 原料顺序沿用源数据行顺序,不去重
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub batch_id: String,
    pub ingredients: Vec<ProductCode>,
}

impl Batch {
    pub fn new(batch_id: impl Into<String>, ingredients: Vec<ProductCode>) -> Self {
        Self {
            batch_id: batch_id.into(),
            ingredients,
        }
    }
}

// ==========================================
// HistoryGraph - 历史配方图
// ==========================================
// 父项 → 该父项所有历史批次（按批次号升序）
// 不在图中的编码一律视为原料
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryGraph {
    parents: HashMap<ProductCode, Vec<Batch>>,
}

impl HistoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入（覆盖）某个父项的全部批次
    ///
    /// 允许写入空批次列表,此时该父项解析为"无有效配方"。
    pub fn insert(&mut self, parent: impl Into<ProductCode>, batches: Vec<Batch>) {
        self.parents.insert(parent.into(), batches);
    }

    /// 查询父项的历史批次（None 表示原料）
    pub fn batches(&self, code: &str) -> Option<&[Batch]> {
        self.parents.get(code).map(|b| b.as_slice())
    }

    pub fn is_producible(&self, code: &str) -> bool {
        self.parents.contains_key(code)
    }

    pub fn parent_count(&self) -> usize {
        self.parents.len()
    }

    pub fn batch_count(&self) -> usize {
        self.parents.values().map(|b| b.len()).sum()
    }

    /// 边数（所有批次原料条目之和,含重复）
    pub fn edge_count(&self) -> usize {
        self.parents
            .values()
            .flat_map(|batches| batches.iter())
            .map(|b| b.ingredients.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

// ==========================================
// StockSet - 当前库存物料集合
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSet {
    codes: HashSet<ProductCode>,
}

impl StockSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl<S: Into<ProductCode>> FromIterator<S> for StockSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            codes: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_graph_counts() {
        let mut graph = HistoryGraph::new();
        graph.insert(
            "P1",
            vec![
                Batch::new("B1", vec!["RM1".to_string(), "RM2".to_string()]),
                Batch::new("B2", vec!["RM1".to_string()]),
            ],
        );
        graph.insert("P2", vec![]);

        assert_eq!(graph.parent_count(), 2);
        assert_eq!(graph.batch_count(), 2);
        assert_eq!(graph.edge_count(), 3);
        assert!(graph.is_producible("P2"));
        assert!(!graph.is_producible("RM1"));
        assert!(graph.batches("RM1").is_none());
        assert_eq!(graph.batches("P2").map(|b| b.len()), Some(0));
    }

    #[test]
    fn test_stock_set_from_iter_dedups() {
        let stock: StockSet = vec!["RM1", "RM2", "RM1"].into_iter().collect();
        assert_eq!(stock.len(), 2);
        assert!(stock.contains("RM1"));
        assert!(!stock.contains("RM3"));
    }
}
