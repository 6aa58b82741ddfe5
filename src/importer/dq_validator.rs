// ==========================================
// 配方可生产性检查 - 数据质量校验器实现
// ==========================================
// 职责: 跨数据集校验 + DQ 报告汇总
// ==========================================

use crate::domain::dataset::{DqReport, DqSummary, DqViolation, HistoryRow, StockItem, TargetProduct};
use crate::domain::types::{DatasetKind, DqLevel};
use crate::importer::dataset_importer_trait::DqValidator as DqValidatorTrait;
use std::collections::HashSet;

pub struct DqValidator;

impl DqValidatorTrait for DqValidator {
    fn validate_targets(
        &self,
        targets: &[TargetProduct],
        stock: &[StockItem],
        history: &[HistoryRow],
    ) -> Vec<DqViolation> {
        let known: HashSet<&str> = history
            .iter()
            .flat_map(|r| [r.parent_code.as_str(), r.rm_code.as_str()])
            .chain(stock.iter().map(|s| s.rm_code.as_str()))
            .collect();

        let mut violations = Vec::new();
        let mut seen = HashSet::new();

        for target in targets {
            if !seen.insert(target.product_code.as_str()) {
                violations.push(DqViolation {
                    dataset: DatasetKind::Target,
                    row_number: target.row_number,
                    level: DqLevel::Warning,
                    field: "product_code".to_string(),
                    message: format!("目标编码重复: {}", target.product_code),
                });
            }

            if !known.contains(target.product_code.as_str()) {
                violations.push(DqViolation {
                    dataset: DatasetKind::Target,
                    row_number: target.row_number,
                    level: DqLevel::Warning,
                    field: "product_code".to_string(),
                    message: format!("目标编码在称量历史与库存中均不存在: {}", target.product_code),
                });
            }
        }

        violations
    }
}

impl DqValidator {
    /// 汇总单个数据集的行数统计
    pub fn summarize(
        &self,
        dataset: DatasetKind,
        total_rows: usize,
        accepted_rows: usize,
        violations: &[DqViolation],
    ) -> DqSummary {
        let warning_count = violations
            .iter()
            .filter(|v| v.dataset == dataset && v.level == DqLevel::Warning)
            .count();

        DqSummary {
            total_rows,
            accepted_rows,
            dropped_rows: total_rows.saturating_sub(accepted_rows),
            warning_count,
        }
    }

    /// 生成 DQ 报告（违规按数据集、行号排序）
    pub fn generate_report(
        &self,
        row_counts: [(usize, usize); 3],
        mut violations: Vec<DqViolation>,
    ) -> DqReport {
        let [targets, stock, history] = row_counts;
        violations.sort_by_key(|v| (dataset_order(v.dataset), v.row_number));

        DqReport {
            targets: self.summarize(DatasetKind::Target, targets.0, targets.1, &violations),
            stock: self.summarize(DatasetKind::Stock, stock.0, stock.1, &violations),
            history: self.summarize(DatasetKind::History, history.0, history.1, &violations),
            violations,
        }
    }
}

fn dataset_order(dataset: DatasetKind) -> u8 {
    match dataset {
        DatasetKind::Target => 0,
        DatasetKind::Stock => 1,
        DatasetKind::History => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(code: &str, row: usize) -> TargetProduct {
        TargetProduct {
            row_number: row,
            ..TargetProduct::new(code)
        }
    }

    #[test]
    fn test_duplicate_and_unknown_targets() {
        let targets = vec![target("P1", 2), target("P1", 3), target("GHOST", 4)];
        let history = vec![HistoryRow::new("RM1", "B1", "P1")];

        let violations = DqValidator.validate_targets(&targets, &[], &history);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].row_number, 3);
        assert!(violations[1].message.contains("GHOST"));
        assert!(violations.iter().all(|v| v.level == DqLevel::Warning));
    }

    #[test]
    fn test_generate_report_counts() {
        let violations = vec![
            DqViolation {
                dataset: DatasetKind::History,
                row_number: 9,
                level: DqLevel::Warning,
                field: "parent_code".to_string(),
                message: "self".to_string(),
            },
            DqViolation {
                dataset: DatasetKind::Stock,
                row_number: 3,
                level: DqLevel::Error,
                field: "rm_code".to_string(),
                message: "missing".to_string(),
            },
        ];
        let report = DqValidator.generate_report([(2, 2), (5, 4), (10, 9)], violations);

        assert_eq!(report.stock.dropped_rows, 1);
        assert_eq!(report.history.warning_count, 1);
        assert_eq!(report.violations[0].dataset, DatasetKind::Stock);
        assert_eq!(report.error_count(), 1);
    }
}
