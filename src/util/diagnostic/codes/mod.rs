//! 错误码注册表
//!
//! 提供一致性检查全部错误码的集中定义和管理

pub mod e4xxx;
pub mod e5xxx;
pub mod e8xxx;

pub use e4xxx::*;
pub use e5xxx::*;
pub use e8xxx::*;

pub mod builder;
pub use builder::{DiagnosticBuilder, I18nRegistry};

use once_cell::sync::Lazy;

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Generic,  // E4xxx: 泛型与特质
    Module,   // E5xxx: 模块与依赖
    Internal, // E8xxx: 内部错误
}

impl ErrorCategory {
    /// 全部类别（错误码区间顺序）
    pub const ALL: [ErrorCategory; 3] = [
        ErrorCategory::Generic,
        ErrorCategory::Module,
        ErrorCategory::Internal,
    ];
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            ErrorCategory::Generic => write!(f, "Generic"),
            ErrorCategory::Module => write!(f, "Module"),
            ErrorCategory::Internal => write!(f, "Internal"),
        }
    }
}

/// 错误码定义（仅元数据，展示文案在 i18n 文件）
#[derive(Debug, Clone, Copy)]
pub struct ErrorCodeDefinition {
    /// 错误码，如 "E4004"
    pub code: &'static str,
    /// 错误类别
    pub category: ErrorCategory,
    /// 英文消息模板，支持 {param} 占位符
    pub message_template: &'static str,
}

/// 完整的错误码注册表
static ERROR_CODES: Lazy<Vec<ErrorCodeDefinition>> = Lazy::new(|| {
    let mut codes: Vec<ErrorCodeDefinition> = Vec::new();

    // E4xxx: 泛型与特质
    codes.extend_from_slice(e4xxx::E4XXX);
    // E5xxx: 模块与依赖
    codes.extend_from_slice(e5xxx::E5XXX);
    // E8xxx: 内部错误
    codes.extend_from_slice(e8xxx::E8XXX);

    codes
});

impl ErrorCodeDefinition {
    /// 根据代码查找错误码定义（不区分大小写）
    pub fn find(code: &str) -> Option<&'static Self> {
        ERROR_CODES
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code))
    }

    /// 获取所有错误码
    pub fn all() -> &'static [Self] {
        &ERROR_CODES
    }

    /// 按类别获取错误码
    pub fn by_category(category: ErrorCategory) -> impl Iterator<Item = &'static Self> {
        ERROR_CODES.iter().filter(move |c| c.category == category)
    }

    /// 创建 DiagnosticBuilder
    pub fn builder(&self) -> DiagnosticBuilder {
        DiagnosticBuilder::new(self.code, self.message_template)
    }

    /// 取已注册错误码的构建器；未注册时退回 E8001
    pub(crate) fn registered(code: &'static str) -> DiagnosticBuilder {
        match Self::find(code) {
            Some(def) => def.builder(),
            None => Self::internal_error(&format!("unregistered error code '{}'", code)),
        }
    }
}
