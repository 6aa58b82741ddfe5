// ==========================================
// 配方可生产性检查 - 数据集导入 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 流程: 文件解析 → 列位置映射 → 清洗 → DQ 校验
// ==========================================

use crate::domain::dataset::{
    AnalysisInput, DatasetPaths, DqViolation, HistoryRow, RawHistoryRecord, RawStockRecord,
    RawTargetRecord, StockItem, TargetProduct,
};
use crate::importer::error::ImportResult;
use crate::importer::file_parser::{RawRow, RawSheet};
use std::path::Path;

// ==========================================
// DatasetImporter Trait
// ==========================================
// 用途: 导入主接口
// 实现者: DatasetImporterImpl
pub trait DatasetImporter {
    /// 导入三份输入文件
    ///
    /// # 返回
    /// - Ok(AnalysisInput): 清洗后的记录 + 描述字典 + DQ 报告
    /// - Err: 文件级错误（不存在、格式不支持、列数不足）
    ///
    /// # 说明
    /// 行级问题不会中断导入,统一记入 DQ 报告
    fn import(&self, paths: &DatasetPaths) -> ImportResult<AnalysisInput>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析（阶段 0）
// 实现者: CsvParser, ExcelParser
pub trait FileParser {
    /// 解析文件为按列位置排列的原始行
    ///
    /// # 规则
    /// - 第一行为表头,不进入数据行
    /// - 全空白行跳过
    fn parse(&self, file_path: &Path) -> ImportResult<RawSheet>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 列位置 → 中间结构体（阶段 1）
pub trait FieldMapper {
    fn map_target(&self, row: &RawRow) -> RawTargetRecord;

    fn map_stock(&self, row: &RawRow) -> RawStockRecord;

    fn map_history(&self, row: &RawRow) -> RawHistoryRecord;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 编码标准化、数量解析、丢弃无效行（阶段 2）
// 返回: (保留的记录, 本阶段产生的违规)
pub trait DataCleaner {
    /// 编码标准化: TRIM,空串视为缺失
    fn normalize_code(&self, value: Option<&str>) -> Option<String>;

    fn clean_targets(&self, records: Vec<RawTargetRecord>) -> (Vec<TargetProduct>, Vec<DqViolation>);

    fn clean_stock(&self, records: Vec<RawStockRecord>) -> (Vec<StockItem>, Vec<DqViolation>);

    fn clean_history(&self, records: Vec<RawHistoryRecord>) -> (Vec<HistoryRow>, Vec<DqViolation>);
}

// ==========================================
// DqValidator Trait
// ==========================================
// 用途: 跨数据集校验（阶段 3）
pub trait DqValidator {
    /// 目标清单校验: 重复编码、既无历史也无库存的目标
    fn validate_targets(
        &self,
        targets: &[TargetProduct],
        stock: &[StockItem],
        history: &[HistoryRow],
    ) -> Vec<DqViolation>;
}
