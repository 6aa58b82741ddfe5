// ==========================================
// 配方可生产性检查 - 报表导出层
// ==========================================

pub mod csv_exporter;
pub mod error;

pub use csv_exporter::{CsvReportExporter, DEFAULT_REPORT_FILE, REPORT_HEADERS};
pub use error::{ExportError, ExportResult};
