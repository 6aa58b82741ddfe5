// ==========================================
// 配方可生产性检查 - 字段映射器实现
// ==========================================
// 职责: 列位置 → 中间结构体,不做清洗与类型判断
// ==========================================

use crate::config::column_layout::ColumnLayout;
use crate::domain::dataset::{RawHistoryRecord, RawStockRecord, RawTargetRecord};
use crate::domain::types::DatasetKind;
use crate::importer::dataset_importer_trait::FieldMapper as FieldMapperTrait;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{RawRow, RawSheet};

pub struct FieldMapper {
    layout: ColumnLayout,
}

impl FieldMapper {
    pub fn new(layout: ColumnLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    /// 校验文件列数是否覆盖必需列
    ///
    /// 空文件（无数据行）不校验
    pub fn check_width(&self, sheet: &RawSheet, dataset: DatasetKind) -> ImportResult<()> {
        if sheet.rows.is_empty() {
            return Ok(());
        }

        let (field, column) = match dataset {
            DatasetKind::Target => ("product_code", self.layout.target.required_max()),
            DatasetKind::Stock => ("rm_code", self.layout.stock.required_max()),
            DatasetKind::History => ("rm_code/batch_id/parent_code", self.layout.history.required_max()),
        };

        if sheet.width() <= column {
            return Err(ImportError::InvalidColumn {
                dataset: dataset.to_string(),
                field: field.to_string(),
                column,
            });
        }
        Ok(())
    }
}

fn owned(row: &RawRow, column: usize) -> Option<String> {
    row.cell(column).map(str::to_string)
}

impl FieldMapperTrait for FieldMapper {
    fn map_target(&self, row: &RawRow) -> RawTargetRecord {
        let cols = &self.layout.target;
        RawTargetRecord {
            product_code: owned(row, cols.product_code),
            description: owned(row, cols.description),
            yearly_qty: owned(row, cols.yearly_qty),
            three_month_qty: owned(row, cols.three_month_qty),
            row_number: row.row_number,
        }
    }

    fn map_stock(&self, row: &RawRow) -> RawStockRecord {
        let cols = &self.layout.stock;
        RawStockRecord {
            rm_code: owned(row, cols.rm_code),
            description: owned(row, cols.description),
            row_number: row.row_number,
        }
    }

    fn map_history(&self, row: &RawRow) -> RawHistoryRecord {
        let cols = &self.layout.history;
        RawHistoryRecord {
            rm_code: owned(row, cols.rm_code),
            rm_description: owned(row, cols.rm_description),
            batch_id: owned(row, cols.batch_id),
            parent_code: owned(row, cols.parent_code),
            parent_description: owned(row, cols.parent_description),
            row_number: row.row_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_row(cells: &[&str]) -> RawRow {
        RawRow {
            row_number: 2,
            cells: cells.iter().map(|c| c.to_string()).collect(),
        }
    }

    #[test]
    fn test_map_history_default_layout() {
        let mapper = FieldMapper::new(ColumnLayout::default());
        let row = raw_row(&["RM1", "Sugar", "x", "B1", "", "", "", "", "", "P1", "Cake"]);
        let rec = mapper.map_history(&row);

        assert_eq!(rec.rm_code.as_deref(), Some("RM1"));
        assert_eq!(rec.batch_id.as_deref(), Some("B1"));
        assert_eq!(rec.parent_code.as_deref(), Some("P1"));
        assert_eq!(rec.parent_description.as_deref(), Some("Cake"));
        assert_eq!(rec.row_number, 2);
    }

    #[test]
    fn test_map_stock_short_row() {
        let mapper = FieldMapper::new(ColumnLayout::default());
        let rec = mapper.map_stock(&raw_row(&["a", "b", "c", "RM9"]));
        assert_eq!(rec.rm_code.as_deref(), Some("RM9"));
        assert_eq!(rec.description, None);
    }

    #[test]
    fn test_check_width_rejects_narrow_history() {
        let mapper = FieldMapper::new(ColumnLayout::default());
        let sheet = RawSheet {
            headers: vec!["a".to_string(), "b".to_string()],
            rows: vec![raw_row(&["RM1", "B1"])],
        };
        assert!(matches!(
            mapper.check_width(&sheet, DatasetKind::History),
            Err(ImportError::InvalidColumn { column: 9, .. })
        ));
        assert!(mapper.check_width(&RawSheet::default(), DatasetKind::History).is_ok());
    }
}
