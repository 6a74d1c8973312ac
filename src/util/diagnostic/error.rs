//! 诊断数据结构
//!
//! # 设计原则
//!
//! - `Diagnostic` 的 `message` 和 `help` 在构建时已渲染完成
//! - **只允许通过 `DiagnosticBuilder` 创建诊断**，所有错误码必须在注册表中注册
//!
//! # 创建方式
//!
//! ```ignore
//! // 方式 1: 通过 ErrorCodeDefinition 快捷方法
//! ErrorCodeDefinition::circular_dependency("a -> b -> a").build(i18n);
//!
//! // 方式 2: 通过注册表查找
//! ErrorCodeDefinition::find("E5001")
//!     .map(|def| def.builder().param("module", "core").build(i18n));
//! ```

use serde::Serialize;

/// 诊断严重级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    /// 不影响构建的提示，如重复实现
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// 诊断信息（message 已渲染完成）
///
/// **不可直接构造**。必须通过 `DiagnosticBuilder::build()` 创建，
/// 确保所有错误码都经过注册表验证。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// 严重级别
    pub severity: Severity,
    /// 错误码
    pub code: String,
    /// 完整消息
    pub message: String,
    /// 帮助信息
    pub help: String,
}

impl Diagnostic {
    /// `pub(crate)`: 仅由 `DiagnosticBuilder::build()` 调用，
    /// 外部代码必须通过注册表 + Builder 路径创建诊断。
    pub(crate) fn new(
        severity: Severity,
        code: String,
        message: String,
        help: String,
    ) -> Self {
        Self {
            severity,
            code,
            message,
            help,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)
    }
}
