//! 通用诊断构建器
//!
//! 支持模板参数化的错误消息构建器，配合 i18n 文案注册表使用

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::util::diagnostic::{Diagnostic, Severity};

/// 诊断构建器（支持模板参数）
#[derive(Debug, Clone)]
pub struct DiagnosticBuilder {
    code: &'static str,
    message_template: &'static str,
    params: Vec<(&'static str, String)>,
    severity: Severity,
}

impl DiagnosticBuilder {
    /// 创建新的诊断构建器
    pub fn new(
        code: &'static str,
        template: &'static str,
    ) -> Self {
        Self {
            code,
            message_template: template,
            params: Vec::new(),
            severity: Severity::Error,
        }
    }

    /// 添加模板参数
    pub fn param(
        mut self,
        key: &'static str,
        value: impl Into<String>,
    ) -> Self {
        self.params.push((key, value.into()));
        self
    }

    /// 设置严重级别（默认 error）
    #[inline]
    pub fn severity(
        mut self,
        severity: Severity,
    ) -> Self {
        self.severity = severity;
        self
    }

    /// 构建 Diagnostic
    ///
    /// 模板占位符缺少参数时回落为 E8001，避免输出残缺的消息。
    pub fn build(
        &self,
        i18n: &I18nRegistry,
    ) -> Diagnostic {
        let template = i18n.get_message(self.code).unwrap_or(self.message_template);

        let missing = self.missing_params(self.message_template);
        if !missing.is_empty() {
            let message = format!(
                "Internal error: missing template parameter(s) for '{}': {:?}",
                self.code, missing
            );
            let help = i18n.get_help("E8001");
            return Diagnostic::new(Severity::Error, "E8001".to_string(), message, help);
        }

        let message = i18n.render(template, &self.params);
        let help = i18n.render_help(self.code, &self.params);
        Diagnostic::new(self.severity, self.code.to_string(), message, help)
    }

    /// 模板中没有对应参数的占位符
    fn missing_params(
        &self,
        template: &str,
    ) -> Vec<String> {
        let param_keys: HashSet<&str> = self.params.iter().map(|(k, _)| *k).collect();
        placeholders(template)
            .into_iter()
            .filter(|key| !param_keys.contains(key.as_str()))
            .collect()
    }
}

/// 提取模板中的 `{key}` 占位符
fn placeholders(template: &str) -> Vec<String> {
    let mut keys = Vec::new();
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '{' {
            continue;
        }
        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            chars.next();
            if c == '}' {
                if !key.is_empty() {
                    keys.push(key);
                }
                break;
            }
            key.push(c);
        }
    }
    keys
}

/// JSON 结构（与 i18n/*.json 对应）
#[derive(Debug, Clone, serde::Deserialize)]
struct ErrorInfoJson {
    title: String,
    #[serde(default)]
    message: Option<String>,
    help: String,
}

/// i18n 展示文案注册表（编译期嵌入 JSON，首次使用时解析）
#[derive(Debug, Clone, Default)]
pub struct I18nRegistry {
    entries: HashMap<String, ErrorInfoJson>,
}

/// 加载 i18n 数据；嵌入的文案损坏时得到空表，渲染退回英文模板
fn load_i18n_data(json: &str) -> I18nRegistry {
    let entries: HashMap<String, ErrorInfoJson> = serde_json::from_str(json).unwrap_or_default();
    I18nRegistry { entries }
}

impl I18nRegistry {
    /// 获取英文注册表
    pub fn en() -> &'static Self {
        static REGISTRY: LazyLock<I18nRegistry> =
            LazyLock::new(|| load_i18n_data(include_str!("i18n/en.json")));
        &REGISTRY
    }

    /// 获取中文注册表
    pub fn zh() -> &'static Self {
        static REGISTRY: LazyLock<I18nRegistry> =
            LazyLock::new(|| load_i18n_data(include_str!("i18n/zh.json")));
        &REGISTRY
    }

    /// 根据语言代码获取注册表
    pub fn new(lang: &str) -> &'static Self {
        match lang {
            "zh" => Self::zh(),
            _ => Self::en(),
        }
    }

    /// 获取标题
    pub fn get_title(
        &self,
        code: &str,
    ) -> String {
        self.entries
            .get(code)
            .map(|e| e.title.clone())
            .unwrap_or_else(|| code.to_string())
    }

    /// 获取帮助信息
    pub fn get_help(
        &self,
        code: &str,
    ) -> String {
        self.entries
            .get(code)
            .map(|e| e.help.clone())
            .unwrap_or_default()
    }

    /// 本地化的消息模板
    pub fn get_message(
        &self,
        code: &str,
    ) -> Option<&str> {
        self.entries.get(code)?.message.as_deref()
    }

    /// 渲染模板
    pub fn render(
        &self,
        template: &str,
        params: &[(&'static str, String)],
    ) -> String {
        let mut result = String::with_capacity(template.len() + 64);
        let mut chars = template.chars().peekable();
        let param_map: HashMap<&str, &str> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();

        while let Some(c) = chars.next() {
            if c == '{' {
                let mut key = String::new();
                while let Some(&c) = chars.peek() {
                    if c == '}' {
                        chars.next();
                        if let Some(value) = param_map.get(key.as_str()) {
                            result.push_str(value);
                        } else {
                            // 占位符不存在时保留原样
                            result.push('{');
                            result.push_str(&key);
                            result.push('}');
                        }
                        break;
                    }
                    key.push(c);
                    chars.next();
                }
            } else {
                result.push(c);
            }
        }
        result
    }

    /// 渲染帮助信息
    pub fn render_help(
        &self,
        code: &str,
        params: &[(&'static str, String)],
    ) -> String {
        match self.entries.get(code) {
            Some(entry) => self.render(&entry.help, params),
            None => String::new(),
        }
    }
}
