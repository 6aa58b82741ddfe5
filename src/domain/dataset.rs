// ==========================================
// 配方可生产性检查 - 输入数据集领域模型
// ==========================================
// 职责: 目标清单 / 库存 / 称量历史 三类输入记录,及其导入中间结构与 DQ 报告
// 用途: 导入层写入,引擎层只读
// ==========================================

use crate::domain::types::{DatasetKind, DqLevel, ProductCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

// ==========================================
// TargetProduct - 目标成品
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetProduct {
    pub product_code: ProductCode,
    pub description: Option<String>,
    pub yearly_qty: Option<f64>,      // 年需求量
    pub three_month_qty: Option<f64>, // 近三月需求量
    pub row_number: usize,
}

impl TargetProduct {
    pub fn new(product_code: impl Into<ProductCode>) -> Self {
        Self {
            product_code: product_code.into(),
            description: None,
            yearly_qty: None,
            three_month_qty: None,
            row_number: 0,
        }
    }
}

// ==========================================
// StockItem - 库存物料
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItem {
    pub rm_code: ProductCode,
    pub description: Option<String>,
    pub row_number: usize,
}

// ==========================================
// HistoryRow - 称量历史行（已清洗）
// ==========================================
// 一行 = 某批次中某父项消耗了某原料
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub rm_code: ProductCode,
    pub rm_description: Option<String>,
    pub batch_id: String,
    pub parent_code: ProductCode,
    pub parent_description: Option<String>,
    pub row_number: usize,
}

impl HistoryRow {
    pub fn new(
        rm_code: impl Into<ProductCode>,
        batch_id: impl Into<String>,
        parent_code: impl Into<ProductCode>,
    ) -> Self {
        Self {
            rm_code: rm_code.into(),
            rm_description: None,
            batch_id: batch_id.into(),
            parent_code: parent_code.into(),
            parent_description: None,
            row_number: 0,
        }
    }

    /// 原料编码与父项编码相同（录入噪声）
    pub fn is_self_reference(&self) -> bool {
        self.rm_code == self.parent_code
    }
}

// ==========================================
// 导入中间结构体
// ==========================================
// 生命周期: 仅在导入流程内（字段映射 → 清洗）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTargetRecord {
    pub product_code: Option<String>,
    pub description: Option<String>,
    pub yearly_qty: Option<String>, // 原始文本,清洗阶段解析
    pub three_month_qty: Option<String>,
    pub row_number: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStockRecord {
    pub rm_code: Option<String>,
    pub description: Option<String>,
    pub row_number: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawHistoryRecord {
    pub rm_code: Option<String>,
    pub rm_description: Option<String>,
    pub batch_id: Option<String>,
    pub parent_code: Option<String>,
    pub parent_description: Option<String>,
    pub row_number: usize,
}

// ==========================================
// DescriptionMap - 物料描述字典
// ==========================================
// 优先级（后者覆盖前者）: 历史原料描述 → 库存描述 → 历史父项描述
// 空描述不覆盖已有值
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DescriptionMap {
    entries: HashMap<ProductCode, String>,
}

impl DescriptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: &str, description: Option<&str>) {
        if let Some(desc) = description.map(str::trim).filter(|d| !d.is_empty()) {
            self.entries.insert(code.to_string(), desc.to_string());
        }
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.entries.get(code).map(|d| d.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按既定优先级构建描述字典
    pub fn build(history: &[HistoryRow], stock: &[StockItem]) -> Self {
        let mut map = Self::new();
        for row in history {
            map.insert(&row.rm_code, row.rm_description.as_deref());
        }
        for item in stock {
            map.insert(&item.rm_code, item.description.as_deref());
        }
        for row in history {
            map.insert(&row.parent_code, row.parent_description.as_deref());
        }
        map
    }
}

// ==========================================
// 数据质量 (DQ)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DqViolation {
    pub dataset: DatasetKind,
    pub row_number: usize,
    pub level: DqLevel,
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DqSummary {
    pub total_rows: usize,
    pub accepted_rows: usize,
    pub dropped_rows: usize,
    pub warning_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DqReport {
    pub targets: DqSummary,
    pub stock: DqSummary,
    pub history: DqSummary,
    pub violations: Vec<DqViolation>,
}

impl DqReport {
    pub fn error_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.level == DqLevel::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.level == DqLevel::Warning)
            .count()
    }

    pub fn violations_for(&self, dataset: DatasetKind) -> impl Iterator<Item = &DqViolation> {
        self.violations.iter().filter(move |v| v.dataset == dataset)
    }
}

// ==========================================
// 一次分析的输入
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetPaths {
    pub targets: PathBuf,
    pub stock: PathBuf,
    pub history: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisInput {
    pub targets: Vec<TargetProduct>,
    pub stock: Vec<StockItem>,
    pub history: Vec<HistoryRow>,
    pub descriptions: DescriptionMap,
    pub dq_report: DqReport,
}

impl AnalysisInput {
    /// 由已清洗的记录组装输入（描述字典自动构建）
    pub fn new(targets: Vec<TargetProduct>, stock: Vec<StockItem>, history: Vec<HistoryRow>) -> Self {
        let descriptions = DescriptionMap::build(&history, &stock);
        Self {
            targets,
            stock,
            history,
            descriptions,
            dq_report: DqReport::default(),
        }
    }
}
