// ==========================================
// 配方可生产性检查 - 导入列位置配置
// ==========================================
// 说明: 三类输入文件都按列序号（从 0 开始）取值,不依赖表头文字
// 存储: config_kv `import/column_layout`（JSON）
// ==========================================

use serde::{Deserialize, Serialize};

/// 目标成品清单列位置（默认 A/B/C/D）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetColumns {
    pub product_code: usize,
    pub description: usize,
    pub yearly_qty: usize,
    pub three_month_qty: usize,
}

impl Default for TargetColumns {
    fn default() -> Self {
        Self {
            product_code: 0,
            description: 1,
            yearly_qty: 2,
            three_month_qty: 3,
        }
    }
}

/// 库存列位置（默认 D/I）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockColumns {
    pub rm_code: usize,
    pub description: usize,
}

impl Default for StockColumns {
    fn default() -> Self {
        Self {
            rm_code: 3,
            description: 8,
        }
    }
}

/// 称量历史列位置（默认 A/B/D/J/K）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryColumns {
    pub rm_code: usize,
    pub rm_description: usize,
    pub batch_id: usize,
    pub parent_code: usize,
    pub parent_description: usize,
}

impl Default for HistoryColumns {
    fn default() -> Self {
        Self {
            rm_code: 0,
            rm_description: 1,
            batch_id: 3,
            parent_code: 9,
            parent_description: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLayout {
    pub target: TargetColumns,
    pub stock: StockColumns,
    pub history: HistoryColumns,
}

impl TargetColumns {
    /// 必需列中最大的列序号（主键列）
    pub fn required_max(&self) -> usize {
        self.product_code
    }
}

impl StockColumns {
    pub fn required_max(&self) -> usize {
        self.rm_code
    }
}

impl HistoryColumns {
    pub fn required_max(&self) -> usize {
        self.rm_code.max(self.batch_id).max(self.parent_code)
    }
}
