//! 错误码定义
//!
//! E4xxx: 特质实现一致性的错误码

use super::{DiagnosticBuilder, ErrorCategory, ErrorCodeDefinition};

/// E4xxx 错误码列表
pub static E4XXX: &[ErrorCodeDefinition] = &[
    ErrorCodeDefinition {
        code: "E4004",
        category: ErrorCategory::Generic,
        message_template: "Conflicting implementations of '{trait}': '{impl}' in '{module}' overlaps '{other}' in '{other_module}'",
    },
    ErrorCodeDefinition {
        code: "E4010",
        category: ErrorCategory::Generic,
        message_template: "Orphan implementation '{impl}' of '{trait}' for '{pattern}' in '{module}' (trait owned by '{trait_owner}', type owned by '{type_owner}')",
    },
    ErrorCodeDefinition {
        code: "E4011",
        category: ErrorCategory::Generic,
        message_template: "Duplicate implementation '{impl}' of '{trait}', identical to '{original}'",
    },
];

// E4xxx 快捷方法
impl ErrorCodeDefinition {
    /// E4004 特质实现冲突；调用方补充 `other` 与 `other_module`
    pub fn conflicting_trait_impls(
        trait_: &str,
        impl_: &str,
        module: &str,
    ) -> DiagnosticBuilder {
        Self::registered("E4004")
            .param("trait", trait_)
            .param("impl", impl_)
            .param("module", module)
    }

    /// E4010 孤儿实现；调用方补充 `trait_owner` 与 `type_owner`
    pub fn orphan_impl(
        impl_: &str,
        trait_: &str,
        pattern: &str,
        module: &str,
    ) -> DiagnosticBuilder {
        Self::registered("E4010")
            .param("impl", impl_)
            .param("trait", trait_)
            .param("pattern", pattern)
            .param("module", module)
    }

    /// E4011 重复实现
    pub fn duplicate_trait_impl(
        impl_: &str,
        trait_: &str,
        original: &str,
    ) -> DiagnosticBuilder {
        Self::registered("E4011")
            .param("impl", impl_)
            .param("trait", trait_)
            .param("original", original)
    }
}
