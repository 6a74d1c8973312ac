//! 一致性检查
//!
//! 编排收集、局部性判定与重叠检测，为一个模块生成完整报告：
//!
//! 1. 收集可见声明；失败（循环依赖、未知模块）时报告只含一条致命记录
//! 2. 按声明顺序对本地实现做局部性判定，被拒绝的实现不参与重叠检测
//! 3. 被接纳的本地实现与其余已接纳的可见实现做重叠检测
//! 4. 来自不同依赖、彼此可合一的继承实现对，各报告一次冲突
//!
//! 继承实现只有在对其所属模块通过局部性判定时才参与比较。
//! 检查是无状态的纯函数，不同模块的检查可以并行。

use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{debug, debug_span};

use crate::module::{collect, ImplDecl, ModuleGraph, ModuleId, TraitRef, TypeRef};

use super::fundamental::FundamentalTable;
use super::locality::{Locality, LocalityClassifier};
use super::overlap::{Overlap, OverlapDetector};
use super::report::{Record, Rejection, Report};

/// 一致性检查器
#[derive(Debug, Clone, Default)]
pub struct CoherenceChecker {
    /// 声明标记之外额外登记的基础类型
    extra_fundamentals: Vec<TypeRef>,
    detector: OverlapDetector,
}

impl CoherenceChecker {
    /// 创建新的检查器
    pub fn new() -> Self {
        Self::default()
    }

    /// 额外登记基础类型构造器
    pub fn with_fundamentals<I>(
        mut self,
        extra: I,
    ) -> Self
    where
        I: IntoIterator<Item = TypeRef>,
    {
        self.extra_fundamentals.extend(extra);
        self
    }

    /// 检查一个模块
    pub fn check(
        &self,
        graph: &ModuleGraph,
        module: &ModuleId,
    ) -> Report {
        let span = debug_span!("coherence_check", module = %module);
        let _enter = span.enter();

        let visible = match collect(graph, module) {
            Ok(visible) => visible,
            Err(error) => {
                debug!(%error, "collection failed");
                return Report::fatal(module.clone(), error);
            }
        };

        let fundamentals = FundamentalTable::from_visible(&visible)
            .with_extra(self.extra_fundamentals.iter().cloned());
        let classifier = LocalityClassifier::new(&fundamentals);

        // 本地实现：按声明顺序判定局部性
        let local: Vec<(&ImplDecl, Locality)> = visible
            .local_impls()
            .map(|decl| (decl, classifier.classify(decl, module)))
            .collect();

        // 继承实现：对其所属模块判定
        let inherited: Vec<&ImplDecl> = visible
            .inherited_impls()
            .filter(|decl| classifier.classify(decl, &decl.owner).is_admitted())
            .collect();

        let admitted: Vec<&ImplDecl> = local
            .iter()
            .filter(|(_, locality)| locality.is_admitted())
            .map(|(decl, _)| *decl)
            .chain(inherited.iter().copied())
            .collect();

        let mut report = Report::new(module.clone());
        for (decl, locality) in local {
            let record = match locality {
                Locality::Reject(violation) => {
                    rejected(decl, Rejection::OrphanViolation(violation))
                }
                Locality::Admit(admission) => match self.detector.detect(decl, &admitted) {
                    None => Record::Accepted {
                        impl_id: decl.id.clone(),
                        module: decl.owner.clone(),
                        trait_ref: decl.trait_ref.clone(),
                        pattern: decl.pattern.to_string(),
                        admission,
                    },
                    Some(Overlap::Duplicate { original }) => rejected(
                        decl,
                        Rejection::DuplicateImplementation {
                            original_impl_id: original,
                        },
                    ),
                    Some(Overlap::Conflict {
                        conflicting_impl,
                        conflicting_module,
                    }) => rejected(
                        decl,
                        Rejection::CoherenceViolation {
                            conflicting_impl_id: conflicting_impl,
                            conflicting_module,
                        },
                    ),
                },
            };
            report.records.push(record);
        }

        report
            .records
            .extend(self.inherited_conflicts(&inherited));

        let summary = report.summary();
        debug!(
            accepted = summary.accepted,
            orphan = summary.orphan,
            coherence = summary.coherence,
            duplicate = summary.duplicate,
            "module checked"
        );
        report
    }

    /// 依赖之间的冲突：同一特质、不同所属模块、模式可合一
    ///
    /// 每对只报告一次，按 (模块, 实现ID) 规范排序，结果与依赖声明顺序无关。
    fn inherited_conflicts(
        &self,
        inherited: &[&ImplDecl],
    ) -> Vec<Record> {
        let mut by_trait: IndexMap<&TraitRef, Vec<&ImplDecl>> = IndexMap::new();
        for decl in inherited {
            by_trait.entry(&decl.trait_ref).or_default().push(*decl);
        }

        let mut pairs: Vec<(&ImplDecl, &ImplDecl)> = Vec::new();
        for impls in by_trait.values() {
            for (i, a) in impls.iter().enumerate() {
                for b in &impls[i + 1..] {
                    if a.owner != b.owner && self.detector.overlaps(a, b) {
                        let (first, second) = if (&a.owner, &a.id) <= (&b.owner, &b.id) {
                            (*a, *b)
                        } else {
                            (*b, *a)
                        };
                        pairs.push((first, second));
                    }
                }
            }
        }
        pairs.sort_by(|(a1, b1), (a2, b2)| {
            (&a1.owner, &a1.id, &b1.owner, &b1.id).cmp(&(&a2.owner, &a2.id, &b2.owner, &b2.id))
        });

        pairs
            .into_iter()
            .map(|(first, second)| {
                debug!(
                    impl_id = %first.id,
                    conflicting = %second.id,
                    "conflict between dependencies"
                );
                rejected(
                    first,
                    Rejection::CoherenceViolation {
                        conflicting_impl_id: second.id.clone(),
                        conflicting_module: second.owner.clone(),
                    },
                )
            })
            .collect()
    }

    /// 检查多个模块；`parallel` 时在 rayon 线程池上并行，结果顺序与输入一致
    pub fn check_all(
        &self,
        graph: &ModuleGraph,
        modules: &[ModuleId],
        parallel: bool,
    ) -> Vec<Report> {
        if parallel {
            modules
                .par_iter()
                .map(|module| self.check(graph, module))
                .collect()
        } else {
            modules
                .iter()
                .map(|module| self.check(graph, module))
                .collect()
        }
    }
}

fn rejected(
    decl: &ImplDecl,
    rejection: Rejection,
) -> Record {
    Record::Rejected {
        impl_id: decl.id.clone(),
        module: decl.owner.clone(),
        trait_ref: decl.trait_ref.clone(),
        pattern: decl.pattern.to_string(),
        rejection,
    }
}
