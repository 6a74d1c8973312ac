//! 重叠/冲突检测
//!
//! 只比较同一特质的可见实现。两个模式能合一，即存在某个具体类型同时被两者覆盖。
//! 不做特化：来自不同模块的任何可合一实现对都是冲突。

use serde::Serialize;
use tracing::trace;

use crate::module::{ImplDecl, ImplId, ModuleId};

use super::unify::can_unify;

/// 检测到的重叠
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "overlap", rename_all = "snake_case")]
pub enum Overlap {
    /// 同模块中已有结构相同的实现
    Duplicate { original: ImplId },
    /// 与另一实现可合一
    Conflict {
        conflicting_impl: ImplId,
        conflicting_module: ModuleId,
    },
}

/// 重叠检测器
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlapDetector;

impl OverlapDetector {
    pub fn new() -> Self {
        Self
    }

    /// 将新实现与已接纳的可见实现比较
    ///
    /// `visible` 按可见顺序排列。同模块的实现只有排在 `new` 之前才算作
    /// 已有条目，因此同模块的一对重复/重叠实现只在后声明者上报告一次。
    /// `new` 不在 `visible` 中时，同模块的全部实现都视为已有条目。
    pub fn detect(
        &self,
        new: &ImplDecl,
        visible: &[&ImplDecl],
    ) -> Option<Overlap> {
        let position = visible
            .iter()
            .position(|v| v.owner == new.owner && v.id == new.id)
            .unwrap_or(visible.len());

        let existing: Vec<&ImplDecl> = visible
            .iter()
            .enumerate()
            .filter(|(i, v)| {
                v.trait_ref == new.trait_ref
                    && !(v.owner == new.owner && v.id == new.id)
                    && (v.owner != new.owner || *i < position)
            })
            .map(|(_, v)| *v)
            .collect();

        if let Some(original) = existing
            .iter()
            .find(|v| v.owner == new.owner && v.pattern.is_identical(&new.pattern))
        {
            trace!(impl_id = %new.id, original = %original.id, "duplicate implementation");
            return Some(Overlap::Duplicate {
                original: original.id.clone(),
            });
        }

        existing
            .iter()
            .find(|v| can_unify(&new.pattern, &v.pattern))
            .map(|v| {
                trace!(
                    impl_id = %new.id,
                    conflicting = %v.id,
                    conflicting_module = %v.owner,
                    "overlapping implementation"
                );
                Overlap::Conflict {
                    conflicting_impl: v.id.clone(),
                    conflicting_module: v.owner.clone(),
                }
            })
    }

    /// 两个实现是否冲突（同一特质且模式可合一）
    pub fn overlaps(
        &self,
        a: &ImplDecl,
        b: &ImplDecl,
    ) -> bool {
        a.trait_ref == b.trait_ref && can_unify(&a.pattern, &b.pattern)
    }
}
