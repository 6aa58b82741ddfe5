// ==========================================
// 配方可生产性检查 - 领域类型定义
// ==========================================
// 职责: 物料编码、配方解析结果种类、缺料来源、数据质量等级
// 红线: 结果种类必须是封闭枚举,不允许"魔法字符串"分支
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 物料编码（原料 / 半成品 / 成品共用，已 TRIM）
///
/// 一个编码是叶子（原料）还是可生产节点，只取决于它是否出现在历史配方图的父项中。
pub type ProductCode = String;

// ==========================================
// 配方解析结果种类 (Recipe Outcome)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "kind", content = "batch_id")]
pub enum RecipeOutcome {
    Batch(String),      // 选中的历史批次号
    RawMaterial,        // 无历史配方,按原料处理
    CircularReference,  // 循环引用（仅对当前展开路径有效）
    NoValidRecipe,      // 父项存在但没有任何批次
    DepthLimitExceeded, // 超过最大展开深度
}

impl RecipeOutcome {
    /// 选中的批次号（非批次结果返回 None）
    pub fn batch_id(&self) -> Option<&str> {
        match self {
            RecipeOutcome::Batch(id) => Some(id.as_str()),
            _ => None,
        }
    }

    /// 结果是否只对当前调用链有效（不可写入缓存）
    pub fn is_path_dependent(&self) -> bool {
        matches!(
            self,
            RecipeOutcome::CircularReference | RecipeOutcome::DepthLimitExceeded
        )
    }
}

impl fmt::Display for RecipeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipeOutcome::Batch(id) => write!(f, "{}", id),
            RecipeOutcome::RawMaterial => write!(f, "RAW_MATERIAL"),
            RecipeOutcome::CircularReference => write!(f, "CIRCULAR_REFERENCE"),
            RecipeOutcome::NoValidRecipe => write!(f, "NO_VALID_RECIPE"),
            RecipeOutcome::DepthLimitExceeded => write!(f, "DEPTH_LIMIT_EXCEEDED"),
        }
    }
}

// ==========================================
// 缺料来源 (Missing Source)
// ==========================================
// 相对于结果所属物料表达:
// - Direct: 最近的生产祖先就是结果所属物料本身
// - Via(X): 缺料是在半成品 X 内部引入的
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "kind", content = "ancestor")]
pub enum MissingSource {
    Direct,
    Via(ProductCode),
}

impl MissingSource {
    /// 解析为具体祖先编码（Direct 时返回结果所属物料）
    pub fn ancestor<'a>(&'a self, owner: &'a str) -> &'a str {
        match self {
            MissingSource::Direct => owner,
            MissingSource::Via(code) => code.as_str(),
        }
    }
}

impl fmt::Display for MissingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingSource::Direct => write!(f, "DIRECT"),
            MissingSource::Via(code) => write!(f, "VIA {}", code),
        }
    }
}

// ==========================================
// 数据质量等级 (DQ Level)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DqLevel {
    Error,   // 行被丢弃
    Warning, // 行保留,但存在异常
}

impl fmt::Display for DqLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DqLevel::Error => write!(f, "ERROR"),
            DqLevel::Warning => write!(f, "WARNING"),
        }
    }
}

// ==========================================
// 输入数据集种类
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DatasetKind {
    Target,  // 目标成品清单
    Stock,   // 当前库存
    History, // 称量历史
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetKind::Target => write!(f, "TARGET"),
            DatasetKind::Stock => write!(f, "STOCK"),
            DatasetKind::History => write!(f, "HISTORY"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_source_ancestor() {
        assert_eq!(MissingSource::Direct.ancestor("P1"), "P1");
        assert_eq!(MissingSource::Via("INT1".to_string()).ancestor("P1"), "INT1");
    }

    #[test]
    fn test_outcome_path_dependent() {
        assert!(RecipeOutcome::CircularReference.is_path_dependent());
        assert!(RecipeOutcome::DepthLimitExceeded.is_path_dependent());
        assert!(!RecipeOutcome::RawMaterial.is_path_dependent());
        assert!(!RecipeOutcome::Batch("B1".to_string()).is_path_dependent());
    }

    #[test]
    fn test_outcome_serde_format() {
        let json = serde_json::to_string(&RecipeOutcome::Batch("B7".to_string())).unwrap();
        assert_eq!(json, r#"{"kind":"BATCH","batch_id":"B7"}"#);

        let json = serde_json::to_string(&RecipeOutcome::RawMaterial).unwrap();
        assert_eq!(json, r#"{"kind":"RAW_MATERIAL"}"#);
    }
}
