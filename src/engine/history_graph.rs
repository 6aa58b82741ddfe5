// ==========================================
// 配方可生产性检查 - 历史配方图构建器
// ==========================================
// 输入: 已清洗的称量历史行 (原料, 批次号, 父项)
// 输出: HistoryGraph (父项 → 批次列表)
// 规则: 先按父项分组,再按批次号分组;批次号升序;批次内保持行顺序
// ==========================================

use crate::domain::dataset::HistoryRow;
use crate::domain::formula::{Batch, HistoryGraph};
use crate::domain::types::ProductCode;
use std::collections::BTreeMap;
use tracing::debug;

/// HistoryGraphBuilder - 历史配方图构建器
#[derive(Debug, Default)]
pub struct HistoryGraphBuilder;

impl HistoryGraphBuilder {
    pub fn new() -> Self {
        Self
    }

    /// 由称量历史行构建配方图
    ///
    /// # 规则
    /// - 原料 == 父项 的自引用行直接丢弃
    /// - 同批次内的重复原料不去重
    pub fn build(&self, rows: &[HistoryRow]) -> HistoryGraph {
        let mut grouped: BTreeMap<&str, BTreeMap<&str, Vec<ProductCode>>> = BTreeMap::new();
        let mut self_refs = 0usize;

        for row in rows {
            if row.is_self_reference() {
                self_refs += 1;
                continue;
            }
            grouped
                .entry(row.parent_code.as_str())
                .or_default()
                .entry(row.batch_id.as_str())
                .or_default()
                .push(row.rm_code.clone());
        }

        let mut graph = HistoryGraph::new();
        for (parent, batches) in grouped {
            let batches = batches
                .into_iter()
                .filter(|(_, ingredients)| !ingredients.is_empty())
                .map(|(batch_id, ingredients)| Batch::new(batch_id, ingredients))
                .collect();
            graph.insert(parent, batches);
        }

        debug!(
            rows = rows.len(),
            skipped_self_refs = self_refs,
            parents = graph.parent_count(),
            batches = graph.batch_count(),
            edges = graph.edge_count(),
            "历史配方图构建完成"
        );

        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(rm: &str, batch: &str, parent: &str) -> HistoryRow {
        HistoryRow::new(rm, batch, parent)
    }

    #[test]
    fn test_groups_by_parent_then_batch() {
        let rows = vec![
            row("RM1", "B2", "P1"),
            row("RM2", "B1", "P1"),
            row("RM3", "B1", "P1"),
            row("RM4", "B9", "P2"),
        ];

        let graph = HistoryGraphBuilder::new().build(&rows);
        assert_eq!(graph.parent_count(), 2);

        let p1 = graph.batches("P1").unwrap();
        assert_eq!(p1.len(), 2);
        // 批次号升序
        assert_eq!(p1[0].batch_id, "B1");
        assert_eq!(p1[0].ingredients, vec!["RM2".to_string(), "RM3".to_string()]);
        assert_eq!(p1[1].batch_id, "B2");
    }

    #[test]
    fn test_self_reference_dropped() {
        let rows = vec![row("P1", "B1", "P1"), row("RM1", "B1", "P1")];
        let graph = HistoryGraphBuilder::new().build(&rows);
        assert_eq!(graph.batches("P1").unwrap()[0].ingredients, vec!["RM1".to_string()]);
    }

    #[test]
    fn test_only_self_reference_leaves_code_as_leaf() {
        let rows = vec![row("X", "B1", "X")];
        let graph = HistoryGraphBuilder::new().build(&rows);
        assert!(!graph.is_producible("X"));
    }

    #[test]
    fn test_duplicate_ingredients_kept() {
        let rows = vec![row("RM1", "B1", "P1"), row("RM1", "B1", "P1")];
        let graph = HistoryGraphBuilder::new().build(&rows);
        assert_eq!(graph.batches("P1").unwrap()[0].ingredients.len(), 2);
    }
}
