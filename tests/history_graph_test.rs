// ==========================================
// HistoryGraphBuilder / DescriptionMap 集成测试
// ==========================================


use formula_feasibility::{
    DescriptionMap, HistoryGraphBuilder, HistoryRow, RecipeOutcome, RecipeResolver,
    ResolverContext, StockItem,
};
use test_helpers::stock;

fn row(rm: &str, batch: &str, parent: &str) -> HistoryRow {
    HistoryRow::new(rm, batch, parent)
}

fn described(rm: &str, rm_desc: &str, batch: &str, parent: &str, parent_desc: &str) -> HistoryRow {
    let mut r = HistoryRow::new(rm, batch, parent);
    r.rm_description = Some(rm_desc.to_string()).filter(|d| !d.is_empty());
    r.parent_description = Some(parent_desc.to_string()).filter(|d| !d.is_empty());
    r
}

#[test]
fn test_graph_stats_count_duplicates_as_edges() {
    let rows = vec![
        row("RM1", "B1", "P1"),
        row("RM1", "B1", "P1"),
        row("RM2", "B2", "P1"),
        row("RM3", "B3", "P2"),
    ];
    let graph = HistoryGraphBuilder::new().build(&rows);

    assert_eq!(graph.parent_count(), 2);
    assert_eq!(graph.batch_count(), 3);
    assert_eq!(graph.edge_count(), 4);
}

#[test]
fn test_batch_ids_sorted_regardless_of_row_order() {
    let rows = vec![
        row("RM1", "B30", "P1"),
        row("RM2", "B10", "P1"),
        row("RM3", "B20", "P1"),
    ];
    let graph = HistoryGraphBuilder::new().build(&rows);
    let ids: Vec<&str> = graph
        .batches("P1")
        .unwrap()
        .iter()
        .map(|b| b.batch_id.as_str())
        .collect();
    assert_eq!(ids, vec!["B10", "B20", "B30"]);
}

#[test]
fn test_duplicate_ingredient_counted_once_in_ratio() {
    let rows = vec![
        row("RM1", "B1", "P1"),
        row("RM1", "B1", "P1"),
        row("RM2", "B1", "P1"),
    ];
    let graph = HistoryGraphBuilder::new().build(&rows);
    let s = stock(&["RM1"]);
    let resolver = RecipeResolver::new(&graph, &s);
    let mut ctx = ResolverContext::new();

    let r = resolver.resolve("P1", &mut ctx);
    assert_eq!(r.exploded.len(), 2);
    assert_eq!(r.availability_ratio, 0.5);
}

#[test]
fn test_self_referencing_parent_resolves_as_raw_material() {
    let rows = vec![row("X", "B1", "X")];
    let graph = HistoryGraphBuilder::new().build(&rows);
    let s = stock(&["X"]);
    let resolver = RecipeResolver::new(&graph, &s);
    let mut ctx = ResolverContext::new();

    let r = resolver.resolve("X", &mut ctx);
    assert_eq!(r.outcome, RecipeOutcome::RawMaterial);
    assert_eq!(r.availability_ratio, 1.0);
}

#[test]
fn test_empty_batch_id_grouped_together() {
    let rows = vec![row("RM1", "", "P1"), row("RM2", "", "P1")];
    let graph = HistoryGraphBuilder::new().build(&rows);
    let batches = graph.batches("P1").unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].batch_id, "");
    assert_eq!(batches[0].ingredients.len(), 2);
}

// ==========================================
// 描述字典优先级
// ==========================================

#[test]
fn test_description_priority_parent_over_stock_over_history() {
    let history = vec![
        described("INT", "Intermediate as RM", "B1", "P1", "Product one"),
        described("RM1", "History RM1", "B1", "P1", "Product one"),
        described("RM2", "History RM2", "B2", "INT", "Intermediate as parent"),
    ];
    let stock_items = vec![
        StockItem {
            rm_code: "RM1".to_string(),
            description: Some("Stock RM1".to_string()),
            row_number: 2,
        },
        StockItem {
            rm_code: "INT".to_string(),
            description: Some("Stock INT".to_string()),
            row_number: 3,
        },
    ];

    let map = DescriptionMap::build(&history, &stock_items);
    assert_eq!(map.get("RM1"), Some("Stock RM1"));
    assert_eq!(map.get("RM2"), Some("History RM2"));
    assert_eq!(map.get("INT"), Some("Intermediate as parent"));
    assert_eq!(map.get("P1"), Some("Product one"));
    assert_eq!(map.get("NOPE"), None);
}

#[test]
fn test_empty_description_never_overrides() {
    let history = vec![
        described("RM1", "Flour", "B1", "P1", "Cake"),
        described("RM1", "", "B2", "P1", ""),
    ];
    let stock_items = vec![StockItem {
        rm_code: "RM1".to_string(),
        description: Some("   ".to_string()),
        row_number: 2,
    }];

    let map = DescriptionMap::build(&history, &stock_items);
    assert_eq!(map.get("RM1"), Some("Flour"));
    assert_eq!(map.get("P1"), Some("Cake"));
}
