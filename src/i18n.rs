// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库,支持英文（默认）和中文
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

use crate::domain::report::ReportLabels;

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"en" 或 "zh-CN"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use formula_feasibility::i18n::t;
/// let msg = t("common.success");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use formula_feasibility::i18n::t_with_args;
/// let msg = t_with_args("import.file_not_found", &[("path", "/tmp/test.csv")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

fn t_in(key: &str, locale: &str) -> String {
    rust_i18n::t!(key, locale = locale).to_string()
}

/// 按指定语言生成报表文案（不修改全局语言）
pub fn report_labels(locale: &str) -> ReportLabels {
    ReportLabels {
        not_applicable: t_in("report.not_applicable", locale),
        no_valid_recipe: t_in("report.no_valid_recipe", locale),
        circular_reference: t_in("report.circular_reference", locale),
        depth_limit_exceeded: t_in("report.depth_limit_exceeded", locale),
        unknown: t_in("report.unknown", locale),
        unknown_intermediate: t_in("report.unknown_intermediate", locale),
        via: t_in("report.via", locale),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // locale 为全局状态,测试默认并行执行,这里串行化
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("zh-CN");
        assert_eq!(current_locale(), "zh-CN");

        set_locale("en");
        assert_eq!(current_locale(), "en");
    }

    #[test]
    fn test_translate_with_args() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("zh-CN");
        let msg = t_with_args("import.file_not_found", &[("path", "/tmp/test.csv")]);
        assert!(msg.contains("/tmp/test.csv"));
        assert!(msg.contains("文件不存在"));

        set_locale("en");
        let msg = t_with_args("import.file_not_found", &[("path", "/tmp/test.csv")]);
        assert!(msg.contains("File not found"));
    }

    #[test]
    fn test_english_labels_match_defaults() {
        assert_eq!(report_labels("en"), ReportLabels::default());
    }

    #[test]
    fn test_chinese_labels_do_not_touch_global_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("en");
        let labels = report_labels("zh-CN");
        assert_eq!(labels.not_applicable, "不适用");
        assert_eq!(labels.via, "经由");
        assert_eq!(current_locale(), "en");
    }
}
