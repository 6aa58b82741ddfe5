// ==========================================
// 配方可生产性检查 - 分析报表领域模型
// ==========================================
// 职责: 每个目标成品一行的齐套分析结果 + 运行汇总
// 对齐: analysis_result 表 / CSV 导出列
// ==========================================

use crate::domain::types::{ProductCode, RecipeOutcome};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// ReportLabels - 报表文案
// ==========================================
// 每次运行开始时一次性确定（可来自 i18n）,报表生成过程不再读全局语言状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLabels {
    pub not_applicable: String,
    pub no_valid_recipe: String,
    pub circular_reference: String,
    pub depth_limit_exceeded: String,
    pub unknown: String,
    pub unknown_intermediate: String,
    pub via: String,
}

impl Default for ReportLabels {
    fn default() -> Self {
        Self {
            not_applicable: "N/A".to_string(),
            no_valid_recipe: "No Valid Recipe".to_string(),
            circular_reference: "Circular Ref".to_string(),
            depth_limit_exceeded: "Depth Limit Exceeded".to_string(),
            unknown: "Unknown".to_string(),
            unknown_intermediate: "Unknown Intermediate".to_string(),
            via: "via".to_string(),
        }
    }
}

impl ReportLabels {
    /// 报表"使用配方"列的文案
    pub fn formula_used(&self, outcome: &RecipeOutcome) -> String {
        match outcome {
            RecipeOutcome::Batch(id) => id.clone(),
            RecipeOutcome::RawMaterial => self.not_applicable.clone(),
            RecipeOutcome::NoValidRecipe => self.no_valid_recipe.clone(),
            RecipeOutcome::CircularReference => self.circular_reference.clone(),
            RecipeOutcome::DepthLimitExceeded => self.depth_limit_exceeded.clone(),
        }
    }
}

// ==========================================
// MissingDetail - 缺料明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingDetail {
    pub code: ProductCode,
    pub description: String,
    /// 经由的中间祖先（祖先即目标本身时为 None）
    pub via: Option<MissingAncestor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingAncestor {
    pub code: ProductCode,
    pub description: String,
}

impl MissingDetail {
    /// `CODE (DESC)` 或 `CODE (DESC) [via ANCESTOR - DESC]`
    pub fn render(&self, via_label: &str) -> String {
        match &self.via {
            None => format!("{} ({})", self.code, self.description),
            Some(ancestor) => format!(
                "{} ({}) [{} {} - {}]",
                self.code, self.description, via_label, ancestor.code, ancestor.description
            ),
        }
    }
}

impl fmt::Display for MissingDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render("via"))
    }
}

// ==========================================
// FeasibilityRow - 单个目标成品的分析结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityRow {
    pub product_code: ProductCode,
    pub description: Option<String>,
    pub yearly_qty: Option<f64>,
    pub three_month_qty: Option<f64>,
    pub outcome: RecipeOutcome,
    pub formula_used: String,
    pub ingredient_count: usize,
    pub available_count: usize,
    pub availability_ratio: f64,
    pub missing_count: usize,
    pub missing_details: Vec<MissingDetail>,
    /// 渲染后的缺料清单（已按分隔符拼接）
    pub missing_list: String,
}

impl FeasibilityRow {
    pub fn is_fully_available(&self) -> bool {
        self.ingredient_count > 0 && self.missing_count == 0
    }
}

// ==========================================
// AnalysisSummary - 运行汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_targets: usize,
    pub fully_available: usize,     // 齐套率 = 100%
    pub partially_available: usize, // 0 < 齐套率 < 100%
    pub unavailable: usize,         // 齐套率 = 0
}

impl AnalysisSummary {
    pub fn from_rows(rows: &[FeasibilityRow]) -> Self {
        let mut summary = Self {
            total_targets: rows.len(),
            ..Default::default()
        };
        for row in rows {
            if row.availability_ratio >= 1.0 {
                summary.fully_available += 1;
            } else if row.availability_ratio > 0.0 {
                summary.partially_available += 1;
            } else {
                summary.unavailable += 1;
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_direct_and_via() {
        let direct = MissingDetail {
            code: "RM2".to_string(),
            description: "Salt".to_string(),
            via: None,
        };
        assert_eq!(direct.render("via"), "RM2 (Salt)");

        let indirect = MissingDetail {
            code: "RM9".to_string(),
            description: "Pepper".to_string(),
            via: Some(MissingAncestor {
                code: "INT1".to_string(),
                description: "Spice Mix".to_string(),
            }),
        };
        assert_eq!(indirect.render("via"), "RM9 (Pepper) [via INT1 - Spice Mix]");
        assert_eq!(indirect.render("经由"), "RM9 (Pepper) [经由 INT1 - Spice Mix]");
    }

    #[test]
    fn test_formula_used_labels() {
        let labels = ReportLabels::default();
        assert_eq!(labels.formula_used(&RecipeOutcome::Batch("B9".into())), "B9");
        assert_eq!(labels.formula_used(&RecipeOutcome::RawMaterial), "N/A");
        assert_eq!(
            labels.formula_used(&RecipeOutcome::NoValidRecipe),
            "No Valid Recipe"
        );
    }
}
