//! 文本诊断渲染器

use owo_colors::OwoColorize;

use crate::traits::report::Report;
use crate::util::diagnostic::codes::I18nRegistry;
use crate::util::diagnostic::{Diagnostic, Severity};

/// 渲染器配置
#[derive(Debug, Clone)]
pub struct EmitterConfig {
    /// 是否启用颜色输出
    pub use_colors: bool,
    /// 是否显示帮助信息
    pub show_help: bool,
    /// 是否为每个模块输出汇总行
    pub show_summary: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            use_colors: true,
            show_help: true,
            show_summary: true,
        }
    }
}

/// 文本诊断渲染器
#[derive(Debug, Clone)]
pub struct TextEmitter {
    config: EmitterConfig,
}

impl TextEmitter {
    /// 创建新的文本渲染器
    pub fn new() -> Self {
        Self {
            config: EmitterConfig::default(),
        }
    }

    /// 使用自定义配置创建渲染器
    pub fn with_config(config: EmitterConfig) -> Self {
        Self { config }
    }

    /// 渲染单个诊断
    pub fn render(
        &self,
        diagnostic: &Diagnostic,
    ) -> String {
        let mut output = self.render_header(diagnostic);
        if self.config.show_help && !diagnostic.help.is_empty() {
            output.push_str(&format!("  {} {}\n", self.paint("= help:", None), diagnostic.help));
        }
        output
    }

    /// 渲染一个模块的报告：诊断在前，汇总行在后
    pub fn render_report(
        &self,
        report: &Report,
        i18n: &I18nRegistry,
    ) -> String {
        let mut output = String::new();
        for diagnostic in report.diagnostics(i18n) {
            output.push_str(&self.render(&diagnostic));
        }

        if self.config.show_summary {
            let summary = report.summary();
            let line = if report.is_fatal() {
                format!("module '{}': check aborted", report.module)
            } else {
                format!(
                    "module '{}': {} accepted, {} orphan, {} conflicting, {} duplicate",
                    report.module,
                    summary.accepted,
                    summary.orphan,
                    summary.coherence,
                    summary.duplicate
                )
            };
            output.push_str(&self.paint(&line, None));
            output.push('\n');
        }
        output
    }

    /// 渲染错误头部 `error[E4010]: ...`
    fn render_header(
        &self,
        diagnostic: &Diagnostic,
    ) -> String {
        let label = format!("{}[{}]", diagnostic.severity, diagnostic.code);
        format!(
            "{}: {}\n",
            self.paint(&label, Some(diagnostic.severity)),
            diagnostic.message
        )
    }

    /// 着色；`None` 为加粗
    fn paint(
        &self,
        text: &str,
        severity: Option<Severity>,
    ) -> String {
        if !self.config.use_colors {
            return text.to_string();
        }

        match severity {
            Some(Severity::Error) => text.red().bold().to_string(),
            Some(Severity::Info) => text.blue().bold().to_string(),
            None => text.bold().to_string(),
        }
    }
}
