//! 统一诊断系统
//!
//! 一致性检查的记录经错误码注册表转换为诊断，再由输出器渲染。
//!
//! # 模块结构
//!
//! - [`error`] - 诊断数据结构 (Diagnostic, Severity)
//! - [`codes`] - 错误码注册表与诊断构建器
//! - [`emitter`] - 文本 / JSON 输出

pub mod codes;
pub mod emitter;
pub mod error;

// 重新导出
pub use codes::{DiagnosticBuilder, ErrorCategory, ErrorCodeDefinition, I18nRegistry};
pub use emitter::{EmitterConfig, JsonEmitter, TextEmitter};
pub use error::{Diagnostic, Severity};
