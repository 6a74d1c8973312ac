//! 错误码定义
//!
//! E5xxx: 模块与依赖的错误码

use super::{DiagnosticBuilder, ErrorCategory, ErrorCodeDefinition};

/// E5xxx 错误码列表
pub static E5XXX: &[ErrorCodeDefinition] = &[
    ErrorCodeDefinition {
        code: "E5001",
        category: ErrorCategory::Module,
        message_template: "Module '{module}' not found",
    },
    ErrorCodeDefinition {
        code: "E5004",
        category: ErrorCategory::Module,
        message_template: "Circular dependency detected: {path}",
    },
];

// E5xxx 快捷方法
impl ErrorCodeDefinition {
    /// E5001 模块未找到
    pub fn module_not_found(module: &str) -> DiagnosticBuilder {
        Self::registered("E5001").param("module", module)
    }

    /// E5004 循环依赖
    pub fn circular_dependency(path: &str) -> DiagnosticBuilder {
        Self::registered("E5004").param("path", path)
    }
}
