// ==========================================
// 配方可生产性检查 - 数据集导入器实现
// ==========================================
// 职责: 整合导入流程,从三份文件到 AnalysisInput
// 流程: 解析 → 列位置映射 → 清洗 → 跨数据集校验 → 描述字典
// ==========================================

use crate::config::column_layout::ColumnLayout;
use crate::domain::dataset::{AnalysisInput, DatasetPaths, DescriptionMap};
use crate::domain::types::DatasetKind;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::dataset_importer_trait::{
    DataCleaner as _, DatasetImporter, DqValidator as _, FieldMapper as _,
};
use crate::importer::dq_validator::DqValidator;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::{RawSheet, UniversalFileParser};
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};

// ==========================================
// DatasetImporterImpl - 数据集导入器实现
// ==========================================
pub struct DatasetImporterImpl {
    file_parser: UniversalFileParser,
    field_mapper: FieldMapper,
    data_cleaner: DataCleaner,
    dq_validator: DqValidator,
}

impl Default for DatasetImporterImpl {
    fn default() -> Self {
        Self::new(ColumnLayout::default())
    }
}

impl DatasetImporterImpl {
    pub fn new(layout: ColumnLayout) -> Self {
        Self {
            file_parser: UniversalFileParser,
            field_mapper: FieldMapper::new(layout),
            data_cleaner: DataCleaner,
            dq_validator: DqValidator,
        }
    }

    fn parse_sheet(&self, path: &Path, dataset: DatasetKind) -> ImportResult<RawSheet> {
        let sheet = self.file_parser.parse(path).map_err(|e| {
            error!(dataset = %dataset, file = %path.display(), error = %e, "文件解析失败");
            e
        })?;
        self.field_mapper.check_width(&sheet, dataset)?;
        debug!(dataset = %dataset, rows = sheet.rows.len(), "文件解析完成");
        Ok(sheet)
    }
}

impl DatasetImporter for DatasetImporterImpl {
    #[instrument(skip(self, paths), fields(targets = %paths.targets.display()))]
    fn import(&self, paths: &DatasetPaths) -> ImportResult<AnalysisInput> {
        info!("开始导入输入数据");

        // === 步骤 1: 解析文件 ===
        let target_sheet = self.parse_sheet(&paths.targets, DatasetKind::Target)?;
        let stock_sheet = self.parse_sheet(&paths.stock, DatasetKind::Stock)?;
        let history_sheet = self.parse_sheet(&paths.history, DatasetKind::History)?;

        // === 步骤 2: 列位置映射 ===
        let raw_targets: Vec<_> = target_sheet
            .rows
            .iter()
            .map(|r| self.field_mapper.map_target(r))
            .collect();
        let raw_stock: Vec<_> = stock_sheet
            .rows
            .iter()
            .map(|r| self.field_mapper.map_stock(r))
            .collect();
        let raw_history: Vec<_> = history_sheet
            .rows
            .iter()
            .map(|r| self.field_mapper.map_history(r))
            .collect();

        let row_counts = (raw_targets.len(), raw_stock.len(), raw_history.len());

        // === 步骤 3: 清洗 ===
        let (targets, mut violations) = self.data_cleaner.clean_targets(raw_targets);
        let (stock, stock_violations) = self.data_cleaner.clean_stock(raw_stock);
        let (history, history_violations) = self.data_cleaner.clean_history(raw_history);
        violations.extend(stock_violations);
        violations.extend(history_violations);

        // === 步骤 4: 跨数据集校验 ===
        violations.extend(self.dq_validator.validate_targets(&targets, &stock, &history));

        let dq_report = self.dq_validator.generate_report(
            [
                (row_counts.0, targets.len()),
                (row_counts.1, stock.len()),
                (row_counts.2, history.len()),
            ],
            violations,
        );

        if dq_report.error_count() > 0 || dq_report.warning_count() > 0 {
            warn!(
                errors = dq_report.error_count(),
                warnings = dq_report.warning_count(),
                "导入存在数据质量问题"
            );
        }

        // === 步骤 5: 描述字典 ===
        let descriptions = DescriptionMap::build(&history, &stock);

        info!(
            targets = targets.len(),
            stock = stock.len(),
            history = history.len(),
            descriptions = descriptions.len(),
            "输入数据导入完成"
        );

        Ok(AnalysisInput {
            targets,
            stock,
            history,
            descriptions,
            dq_report,
        })
    }
}
