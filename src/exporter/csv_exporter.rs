// ==========================================
// 配方可生产性检查 - CSV 报表导出
// ==========================================
// 列顺序固定,与下游表格模板对齐
// ==========================================

use crate::domain::report::FeasibilityRow;
use crate::exporter::error::{ExportError, ExportResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// 报表表头
pub const REPORT_HEADERS: [&str; 10] = [
    "Product Code",
    "Product Description",
    "Yearly Qty",
    "3M Qty",
    "Formula Used (Batch)",
    "# Ingredients",
    "# Available",
    "Availability Ratio",
    "# Missing",
    "Missing List",
];

/// 默认输出文件名
pub const DEFAULT_REPORT_FILE: &str = "Formula_Availability_Detailed.csv";

pub struct CsvReportExporter;

fn format_qty(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl CsvReportExporter {
    /// 写出到任意 Writer
    pub fn write_to<W: Write>(&self, writer: W, rows: &[FeasibilityRow]) -> ExportResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(REPORT_HEADERS)?;

        for row in rows {
            wtr.write_record([
                row.product_code.clone(),
                row.description.clone().unwrap_or_default(),
                format_qty(row.yearly_qty),
                format_qty(row.three_month_qty),
                row.formula_used.clone(),
                row.ingredient_count.to_string(),
                row.available_count.to_string(),
                format!("{:.4}", row.availability_ratio),
                row.missing_count.to_string(),
                row.missing_list.clone(),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// 写出到文件（覆盖已有文件）
    pub fn export<P: AsRef<Path>>(&self, path: P, rows: &[FeasibilityRow]) -> ExportResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                return Err(ExportError::DirectoryNotFound(parent.display().to_string()));
            }
        }

        let file = File::create(path)?;
        self.write_to(file, rows)?;
        info!(file = %path.display(), rows = rows.len(), "报表已导出");
        Ok(())
    }
}
