//! JSON 报告渲染器
//!
//! 输出机器可读的检查结果：每个模块的记录、汇总和已渲染的诊断。

use serde::Serialize;
use serde_json::to_string_pretty;

use crate::module::ModuleId;
use crate::traits::report::{Record, Report, ReportSummary};
use crate::util::diagnostic::codes::I18nRegistry;
use crate::util::diagnostic::Diagnostic;

/// 单个模块的 JSON 结构
#[derive(Debug, Serialize)]
struct ReportJson<'a> {
    module: &'a ModuleId,
    summary: ReportSummary,
    records: &'a [Record],
    diagnostics: Vec<Diagnostic>,
}

/// 顶层 JSON 结构
#[derive(Debug, Serialize)]
struct OutputJson<'a> {
    reports: Vec<ReportJson<'a>>,
    has_errors: bool,
}

/// JSON 渲染器
#[derive(Debug, Clone)]
pub struct JsonEmitter;

impl JsonEmitter {
    /// 渲染一组报告
    pub fn render_reports(
        reports: &[Report],
        i18n: &I18nRegistry,
        deny_duplicates: bool,
    ) -> String {
        let output = OutputJson {
            reports: reports
                .iter()
                .map(|report| ReportJson {
                    module: &report.module,
                    summary: report.summary(),
                    records: &report.records,
                    diagnostics: report.diagnostics(i18n),
                })
                .collect(),
            has_errors: reports.iter().any(|r| r.has_errors(deny_duplicates)),
        };
        to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }
}
