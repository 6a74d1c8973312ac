//! 基础类型查找表
//!
//! 基础类型是局部性透明的单参数包装类型：`Fundamental<X>` 与 `X` 同样局部。
//! 哪些构造器是基础类型完全由数据决定：来自可见类型声明上的标记，
//! 以及配置中额外登记的构造器。

use std::collections::HashSet;

use crate::module::{TypeRef, VisibleSet};

use super::pattern::TypePattern;

/// 基础类型构造器查找表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FundamentalTable {
    types: HashSet<TypeRef>,
}

impl FundamentalTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从可见类型声明的 `fundamental` 标记构建
    pub fn from_visible(visible: &VisibleSet) -> Self {
        Self {
            types: visible
                .types()
                .filter(|t| t.fundamental)
                .map(|t| t.reference())
                .collect(),
        }
    }

    /// 追加额外的基础类型构造器
    pub fn with_extra<I>(
        mut self,
        extra: I,
    ) -> Self
    where
        I: IntoIterator<Item = TypeRef>,
    {
        self.types.extend(extra);
        self
    }

    pub fn is_fundamental(
        &self,
        ty: &TypeRef,
    ) -> bool {
        self.types.contains(ty)
    }

    /// 若模式是恰好带一个参数的基础类型应用，返回其参数
    pub fn unwrap<'p>(
        &self,
        pattern: &'p TypePattern,
    ) -> Option<&'p TypePattern> {
        match pattern {
            TypePattern::Con { ty, args } if args.len() == 1 && self.is_fundamental(ty) => {
                args.first()
            }
            _ => None,
        }
    }
}
