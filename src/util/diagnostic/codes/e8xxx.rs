//! 错误码定义
//!
//! E8xxx: 内部错误码

use super::{DiagnosticBuilder, ErrorCategory, ErrorCodeDefinition};

const INTERNAL_ERROR_TEMPLATE: &str = "Internal error: {message}";

/// E8xxx 错误码列表
pub static E8XXX: &[ErrorCodeDefinition] = &[ErrorCodeDefinition {
    code: "E8001",
    category: ErrorCategory::Internal,
    message_template: INTERNAL_ERROR_TEMPLATE,
}];

// E8xxx 快捷方法
impl ErrorCodeDefinition {
    /// E8001 内部错误
    pub fn internal_error(message: &str) -> DiagnosticBuilder {
        DiagnosticBuilder::new("E8001", INTERNAL_ERROR_TEMPLATE).param("message", message)
    }
}
