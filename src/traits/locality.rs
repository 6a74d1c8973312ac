//! 局部性判定（孤儿规则）
//!
//! 一个实现只有在请求模块拥有特质、或拥有模式头部类型时才被接纳。
//! 头部类型是最外层构造器，与泛型参数无关：任何泛型参数将来都可能被
//! 不相关的模块实例化，只有最外层构造器的所有者能独自保证全局唯一。
//!
//! 基础类型透明：头部是基础类型且恰有一个参数时，判定递归进入该参数。

use serde::Serialize;
use tracing::trace;

use crate::module::{ImplDecl, ModuleId, TypeRef};

use super::fundamental::FundamentalTable;
use super::pattern::TypePattern;

/// 接纳理由
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "via", rename_all = "snake_case")]
pub enum Admission {
    /// 请求模块拥有特质
    Trait,
    /// 请求模块拥有（解包基础类型后的）头部类型
    Type {
        ty: TypeRef,
        /// 穿过的基础类型层数
        unwrapped: usize,
    },
}

/// 孤儿规则违例
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanViolation {
    pub trait_owner: ModuleId,
    /// 最后检查的构造器的所有者；裸参数模式为 `None`
    pub type_owner: Option<ModuleId>,
}

/// 局部性判定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locality {
    Admit(Admission),
    Reject(OrphanViolation),
}

impl Locality {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Locality::Admit(_))
    }
}

/// 局部性判定器
#[derive(Debug, Clone, Copy)]
pub struct LocalityClassifier<'t> {
    fundamentals: &'t FundamentalTable,
}

impl<'t> LocalityClassifier<'t> {
    pub fn new(fundamentals: &'t FundamentalTable) -> Self {
        Self { fundamentals }
    }

    /// 判定候选实现对请求模块是否局部
    pub fn classify(
        &self,
        candidate: &ImplDecl,
        requesting: &ModuleId,
    ) -> Locality {
        let trait_owner = &candidate.trait_ref.module;
        if trait_owner == requesting {
            trace!(impl_id = %candidate.id, module = %requesting, "admitted via trait");
            return Locality::Admit(Admission::Trait);
        }

        let mut pattern = &candidate.pattern;
        let mut unwrapped = 0;
        let mut last_owner = None;
        let type_owner = loop {
            match pattern {
                TypePattern::Param(_) => break last_owner,
                TypePattern::Con { ty, .. } => {
                    if &ty.module == requesting {
                        trace!(
                            impl_id = %candidate.id,
                            module = %requesting,
                            head = %ty,
                            unwrapped,
                            "admitted via type"
                        );
                        return Locality::Admit(Admission::Type {
                            ty: ty.clone(),
                            unwrapped,
                        });
                    }
                    match self.fundamentals.unwrap(pattern) {
                        Some(inner) => {
                            last_owner = Some(ty.module.clone());
                            pattern = inner;
                            unwrapped += 1;
                        }
                        None => break Some(ty.module.clone()),
                    }
                }
            }
        };

        trace!(impl_id = %candidate.id, module = %requesting, "rejected by orphan rule");
        Locality::Reject(OrphanViolation {
            trait_owner: trait_owner.clone(),
            type_owner,
        })
    }
}
