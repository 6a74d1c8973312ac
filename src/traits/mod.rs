//! 特质一致性模块
//!
//! 保证任意 (特质, 类型) 组合在任何构建中至多有一个适用实现，
//! 只依赖被检查模块及其传递依赖的信息。
//!
//! # 模块结构
//!
//! - [`pattern`] - 类型模式与模式语法
//! - [`unify`] - 一阶模式合一
//! - [`fundamental`] - 基础类型查找表
//! - [`locality`] - 局部性判定（孤儿规则）
//! - [`overlap`] - 重叠/冲突检测
//! - [`coherence`] - 一致性检查编排
//! - [`report`] - 检查报告

pub mod coherence;
pub mod fundamental;
pub mod locality;
pub mod overlap;
pub mod pattern;
pub mod report;
pub mod unify;

#[cfg(test)]
mod tests;

// 重新导出
pub use coherence::CoherenceChecker;
pub use fundamental::FundamentalTable;
pub use locality::{Admission, Locality, LocalityClassifier, OrphanViolation};
pub use overlap::{Overlap, OverlapDetector};
pub use pattern::{parse_pattern, PatternAst, PatternError, TypePattern};
pub use report::{Record, Rejection, Report, ReportSummary};
pub use unify::{can_unify, unify, Side, Substitution};
