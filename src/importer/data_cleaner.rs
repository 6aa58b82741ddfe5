// ==========================================
// 配方可生产性检查 - 数据清洗器实现
// ==========================================
// 职责: 编码 TRIM / 空值标准化 / 数量解析 / 丢弃无效行
// DQ 规则:
// - 必需编码缺失 → 丢弃 (ERROR)
// - 称量历史自引用 (原料 == 父项) → 丢弃 (WARNING)
// - 数量无法解析 → 置空 (WARNING)
// - 批次号缺失 → 保留,归入空批次号 (WARNING)
// ==========================================

use crate::domain::dataset::{
    DqViolation, HistoryRow, RawHistoryRecord, RawStockRecord, RawTargetRecord, StockItem,
    TargetProduct,
};
use crate::domain::types::{DatasetKind, DqLevel};
use crate::importer::dataset_importer_trait::DataCleaner as DataCleanerTrait;

pub struct DataCleaner;

fn violation(
    dataset: DatasetKind,
    row_number: usize,
    level: DqLevel,
    field: &str,
    message: impl Into<String>,
) -> DqViolation {
    DqViolation {
        dataset,
        row_number,
        level,
        field: field.to_string(),
        message: message.into(),
    }
}

impl DataCleaner {
    /// 描述文本: TRIM,空串视为缺失
    pub fn normalize_text(&self, value: Option<&str>) -> Option<String> {
        value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// 解析数量（允许千分位逗号）
    pub fn parse_quantity(&self, value: &str) -> Option<f64> {
        let cleaned: String = value.trim().chars().filter(|c| *c != ',').collect();
        cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    fn clean_quantity(
        &self,
        raw: Option<&str>,
        row_number: usize,
        field: &str,
        violations: &mut Vec<DqViolation>,
    ) -> Option<f64> {
        let raw = raw.map(str::trim).filter(|v| !v.is_empty())?;
        let parsed = self.parse_quantity(raw);
        if parsed.is_none() {
            violations.push(violation(
                DatasetKind::Target,
                row_number,
                DqLevel::Warning,
                field,
                format!("数量无法解析: {}", raw),
            ));
        }
        parsed
    }
}

impl DataCleanerTrait for DataCleaner {
    fn normalize_code(&self, value: Option<&str>) -> Option<String> {
        self.normalize_text(value)
    }

    fn clean_targets(&self, records: Vec<RawTargetRecord>) -> (Vec<TargetProduct>, Vec<DqViolation>) {
        let mut targets = Vec::with_capacity(records.len());
        let mut violations = Vec::new();

        for rec in records {
            let product_code = match self.normalize_code(rec.product_code.as_deref()) {
                Some(code) => code,
                None => {
                    violations.push(violation(
                        DatasetKind::Target,
                        rec.row_number,
                        DqLevel::Error,
                        "product_code",
                        "成品编码缺失",
                    ));
                    continue;
                }
            };

            let yearly_qty = self.clean_quantity(
                rec.yearly_qty.as_deref(),
                rec.row_number,
                "yearly_qty",
                &mut violations,
            );
            let three_month_qty = self.clean_quantity(
                rec.three_month_qty.as_deref(),
                rec.row_number,
                "three_month_qty",
                &mut violations,
            );

            targets.push(TargetProduct {
                product_code,
                description: self.normalize_text(rec.description.as_deref()),
                yearly_qty,
                three_month_qty,
                row_number: rec.row_number,
            });
        }

        (targets, violations)
    }

    fn clean_stock(&self, records: Vec<RawStockRecord>) -> (Vec<StockItem>, Vec<DqViolation>) {
        let mut items = Vec::with_capacity(records.len());
        let mut violations = Vec::new();

        for rec in records {
            match self.normalize_code(rec.rm_code.as_deref()) {
                Some(rm_code) => items.push(StockItem {
                    rm_code,
                    description: self.normalize_text(rec.description.as_deref()),
                    row_number: rec.row_number,
                }),
                None => violations.push(violation(
                    DatasetKind::Stock,
                    rec.row_number,
                    DqLevel::Error,
                    "rm_code",
                    "库存原料编码缺失",
                )),
            }
        }

        (items, violations)
    }

    fn clean_history(&self, records: Vec<RawHistoryRecord>) -> (Vec<HistoryRow>, Vec<DqViolation>) {
        let mut rows = Vec::with_capacity(records.len());
        let mut violations = Vec::new();

        for rec in records {
            let rm_code = self.normalize_code(rec.rm_code.as_deref());
            let parent_code = self.normalize_code(rec.parent_code.as_deref());

            let (rm_code, parent_code) = match (rm_code, parent_code) {
                (Some(rm), Some(parent)) => (rm, parent),
                (rm, _) => {
                    let field = if rm.is_none() { "rm_code" } else { "parent_code" };
                    violations.push(violation(
                        DatasetKind::History,
                        rec.row_number,
                        DqLevel::Error,
                        field,
                        "称量历史编码缺失",
                    ));
                    continue;
                }
            };

            if rm_code == parent_code {
                violations.push(violation(
                    DatasetKind::History,
                    rec.row_number,
                    DqLevel::Warning,
                    "parent_code",
                    format!("自引用记录已忽略: {}", rm_code),
                ));
                continue;
            }

            let batch_id = match self.normalize_code(rec.batch_id.as_deref()) {
                Some(id) => id,
                None => {
                    violations.push(violation(
                        DatasetKind::History,
                        rec.row_number,
                        DqLevel::Warning,
                        "batch_id",
                        "批次号缺失,归入空批次",
                    ));
                    String::new()
                }
            };

            rows.push(HistoryRow {
                rm_code,
                rm_description: self.normalize_text(rec.rm_description.as_deref()),
                batch_id,
                parent_code,
                parent_description: self.normalize_text(rec.parent_description.as_deref()),
                row_number: rec.row_number,
            });
        }

        (rows, violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(rm: Option<&str>, batch: Option<&str>, parent: Option<&str>) -> RawHistoryRecord {
        RawHistoryRecord {
            rm_code: rm.map(str::to_string),
            rm_description: None,
            batch_id: batch.map(str::to_string),
            parent_code: parent.map(str::to_string),
            parent_description: None,
            row_number: 5,
        }
    }

    #[test]
    fn test_normalize_code() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.normalize_code(Some("  RM1 ")), Some("RM1".to_string()));
        assert_eq!(cleaner.normalize_code(Some("   ")), None);
        assert_eq!(cleaner.normalize_code(None), None);
    }

    #[test]
    fn test_parse_quantity() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_quantity("1,200.5"), Some(1200.5));
        assert_eq!(cleaner.parse_quantity(" 7 "), Some(7.0));
        assert_eq!(cleaner.parse_quantity("abc"), None);
    }

    #[test]
    fn test_clean_history_drops_invalid_rows() {
        let records = vec![
            history(Some("RM1"), Some("B1"), Some("P1")),
            history(None, Some("B1"), Some("P1")),
            history(Some("P1"), Some("B1"), Some("P1")),
            history(Some("RM2"), None, Some("P1")),
        ];
        let (rows, violations) = DataCleaner.clean_history(records);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].batch_id, "");
        assert_eq!(violations.len(), 3);
        assert_eq!(violations[0].level, DqLevel::Error);
        assert_eq!(violations[1].level, DqLevel::Warning);
        assert_eq!(violations[2].field, "batch_id");
    }

    #[test]
    fn test_clean_targets_bad_quantity_becomes_none() {
        let records = vec![RawTargetRecord {
            product_code: Some("P1".to_string()),
            description: Some("Cake".to_string()),
            yearly_qty: Some("n/a".to_string()),
            three_month_qty: Some("30".to_string()),
            row_number: 2,
        }];
        let (targets, violations) = DataCleaner.clean_targets(records);

        assert_eq!(targets[0].yearly_qty, None);
        assert_eq!(targets[0].three_month_qty, Some(30.0));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "yearly_qty");
    }
}
