//! 一致性检查报告
//!
//! 每个被处理的实现产生一条记录；收集失败时报告只包含一条致命记录。
//! 是否因拒绝而使构建失败由调用方决定，见 [`Report::has_errors`]。

use serde::Serialize;

use crate::module::{format_cycle, CollectError, ImplId, ModuleId, TraitRef};
use crate::util::diagnostic::codes::{ErrorCodeDefinition, I18nRegistry};
use crate::util::diagnostic::{Diagnostic, Severity};

use super::locality::{Admission, OrphanViolation};

/// 拒绝原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason")]
pub enum Rejection {
    OrphanViolation(OrphanViolation),
    CoherenceViolation {
        conflicting_impl_id: ImplId,
        conflicting_module: ModuleId,
    },
    DuplicateImplementation { original_impl_id: ImplId },
}

impl Rejection {
    /// 重复实现仅为提示级别
    pub fn severity(&self) -> Severity {
        match self {
            Rejection::DuplicateImplementation { .. } => Severity::Info,
            _ => Severity::Error,
        }
    }
}

/// 报告记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Accepted {
        impl_id: ImplId,
        module: ModuleId,
        trait_ref: TraitRef,
        pattern: String,
        admission: Admission,
    },
    Rejected {
        impl_id: ImplId,
        module: ModuleId,
        trait_ref: TraitRef,
        pattern: String,
        rejection: Rejection,
    },
    Fatal { error: CollectError },
}

impl Record {
    /// 记录涉及的实现ID
    pub fn impl_id(&self) -> Option<&ImplId> {
        match self {
            Record::Accepted { impl_id, .. } | Record::Rejected { impl_id, .. } => Some(impl_id),
            Record::Fatal { .. } => None,
        }
    }

    /// 实现所属模块
    pub fn module(&self) -> Option<&ModuleId> {
        match self {
            Record::Accepted { module, .. } | Record::Rejected { module, .. } => Some(module),
            Record::Fatal { .. } => None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Record::Accepted { .. })
    }

    /// 记录的严重级别；接纳记录没有
    pub fn severity(&self) -> Option<Severity> {
        match self {
            Record::Accepted { .. } => None,
            Record::Rejected { rejection, .. } => Some(rejection.severity()),
            Record::Fatal { .. } => Some(Severity::Error),
        }
    }

    /// 转换为已注册错误码的诊断
    pub fn to_diagnostic(
        &self,
        i18n: &I18nRegistry,
    ) -> Option<Diagnostic> {
        let builder = match self {
            Record::Accepted { .. } => return None,
            Record::Rejected {
                impl_id,
                module,
                trait_ref,
                pattern,
                rejection,
            } => match rejection {
                Rejection::OrphanViolation(violation) => ErrorCodeDefinition::orphan_impl(
                    impl_id.as_str(),
                    &trait_ref.to_string(),
                    pattern,
                    module.as_str(),
                )
                .param("trait_owner", violation.trait_owner.as_str())
                .param(
                    "type_owner",
                    violation
                        .type_owner
                        .as_ref()
                        .map(ModuleId::as_str)
                        .unwrap_or("<none>"),
                ),
                Rejection::CoherenceViolation {
                    conflicting_impl_id,
                    conflicting_module,
                } => ErrorCodeDefinition::conflicting_trait_impls(
                    &trait_ref.to_string(),
                    impl_id.as_str(),
                    module.as_str(),
                )
                .param("other", conflicting_impl_id.as_str())
                .param("other_module", conflicting_module.as_str()),
                Rejection::DuplicateImplementation { original_impl_id } => {
                    ErrorCodeDefinition::duplicate_trait_impl(
                        impl_id.as_str(),
                        &trait_ref.to_string(),
                        original_impl_id.as_str(),
                    )
                    .severity(Severity::Info)
                }
            },
            Record::Fatal { error } => match error {
                CollectError::CyclicDependency { cycle } => {
                    ErrorCodeDefinition::circular_dependency(&format_cycle(cycle))
                }
                CollectError::UnknownModule { module, .. } => {
                    ErrorCodeDefinition::module_not_found(module.as_str())
                }
            },
        };
        Some(builder.build(i18n))
    }
}

/// 各类记录的计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub accepted: usize,
    pub orphan: usize,
    pub coherence: usize,
    pub duplicate: usize,
    pub fatal: usize,
}

/// 单个模块的检查报告
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub module: ModuleId,
    pub records: Vec<Record>,
}

impl Report {
    pub fn new(module: ModuleId) -> Self {
        Self {
            module,
            records: Vec::new(),
        }
    }

    /// 只含一条致命记录的报告
    pub fn fatal(
        module: ModuleId,
        error: CollectError,
    ) -> Self {
        Self {
            module,
            records: vec![Record::Fatal { error }],
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.records
            .iter()
            .any(|r| matches!(r, Record::Fatal { .. }))
    }

    /// 致命错误（如有）
    pub fn fatal_error(&self) -> Option<&CollectError> {
        self.records.iter().find_map(|r| match r {
            Record::Fatal { error } => Some(error),
            _ => None,
        })
    }

    /// 被接纳的实现
    pub fn accepted(&self) -> impl Iterator<Item = &ImplId> {
        self.records.iter().filter_map(|r| match r {
            Record::Accepted { impl_id, .. } => Some(impl_id),
            _ => None,
        })
    }

    /// 被拒绝的实现及原因
    pub fn rejections(&self) -> impl Iterator<Item = (&ImplId, &Rejection)> {
        self.records.iter().filter_map(|r| match r {
            Record::Rejected {
                impl_id, rejection, ..
            } => Some((impl_id, rejection)),
            _ => None,
        })
    }

    /// 查找某个实现的记录
    ///
    /// 实现ID只在所属模块内唯一；依赖之间的冲突记录属于依赖模块。
    pub fn record_for(
        &self,
        module: &ModuleId,
        impl_id: &ImplId,
    ) -> Option<&Record> {
        self.records
            .iter()
            .find(|r| r.module() == Some(module) && r.impl_id() == Some(impl_id))
    }

    /// 是否存在错误级别记录；`deny_duplicates` 时重复实现也算错误
    pub fn has_errors(
        &self,
        deny_duplicates: bool,
    ) -> bool {
        self.records.iter().any(|r| match r.severity() {
            Some(Severity::Error) => true,
            Some(_) => deny_duplicates,
            None => false,
        })
    }

    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary::default();
        for record in &self.records {
            match record {
                Record::Accepted { .. } => summary.accepted += 1,
                Record::Rejected { rejection, .. } => match rejection {
                    Rejection::OrphanViolation(_) => summary.orphan += 1,
                    Rejection::CoherenceViolation { .. } => summary.coherence += 1,
                    Rejection::DuplicateImplementation { .. } => summary.duplicate += 1,
                },
                Record::Fatal { .. } => summary.fatal += 1,
            }
        }
        summary
    }

    /// 报告中的所有诊断（记录顺序）
    pub fn diagnostics(
        &self,
        i18n: &I18nRegistry,
    ) -> Vec<Diagnostic> {
        self.records
            .iter()
            .filter_map(|r| r.to_diagnostic(i18n))
            .collect()
    }
}
