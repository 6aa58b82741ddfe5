// ==========================================
// 配方可生产性检查 - 分析配置读取 Trait
// ==========================================
// 职责: 定义分析运行所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入
// ==========================================

use crate::config::column_layout::ColumnLayout;
use crate::config::error::ConfigResult;

// ==========================================
// AnalysisConfigReader Trait
// ==========================================
// 用途: 导入层与引擎层所需的配置
// 实现者: ConfigManager（从 config_kv 表读取）
// 约定: 键不存在时返回默认值,值无法解析时返回 InvalidValue
pub trait AnalysisConfigReader {
    /// 配方展开最大深度
    ///
    /// # 默认值
    /// - 256
    fn get_max_recursion_depth(&self) -> ConfigResult<usize>;

    /// 输入文件列位置
    ///
    /// # 默认值
    /// - 目标 A/B/C/D,库存 D/I,称量历史 A/B/D/J/K
    fn get_column_layout(&self) -> ConfigResult<ColumnLayout>;

    /// 缺料清单分隔符
    ///
    /// # 默认值
    /// - ";"
    fn get_missing_separator(&self) -> ConfigResult<String>;

    /// 报表语言
    ///
    /// # 默认值
    /// - "en"
    fn get_report_locale(&self) -> ConfigResult<String>;
}
