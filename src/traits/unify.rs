//! 一阶模式合一
//!
//! 判断两个类型模式是否存在一个替换，使得两侧所有自由参数被替换后结构完全相同。
//! 两侧的参数处于不同的命名空间（[`Side`]），即 `Wrap<T>` 左侧的 `T`
//! 与右侧的 `T` 互不相干。
//!
//! 合一成功时返回 [`Substitution`]。

use std::collections::HashMap;

use super::pattern::TypePattern;

/// 模式所在的一侧
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// 未绑定参数在共同实例中的后缀；两侧后缀末字符不同，重命名后不会相撞
    fn suffix(self) -> &'static str {
        match self {
            Side::Left => "@0",
            Side::Right => "@1",
        }
    }
}

/// 带侧别的参数变量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Var<'a> {
    side: Side,
    name: &'a str,
}

/// 带侧别的模式项
#[derive(Debug, Clone, Copy)]
struct Term<'a> {
    side: Side,
    pattern: &'a TypePattern,
}

impl<'a> Term<'a> {
    fn var(&self) -> Option<Var<'a>> {
        match self.pattern {
            TypePattern::Param(name) => Some(Var {
                side: self.side,
                name,
            }),
            TypePattern::Con { .. } => None,
        }
    }
}

/// 合一产生的替换
#[derive(Debug, Clone, Default)]
pub struct Substitution<'a> {
    bindings: HashMap<Var<'a>, Term<'a>>,
}

impl<'a> Substitution<'a> {
    /// 已绑定的变量个数
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// 将替换应用到某一侧的模式上，得到共同实例
    ///
    /// 未绑定的参数按所在侧加后缀（`T@0`、`T@1`），两侧的同名参数保持不同。
    pub(crate) fn apply(
        &self,
        side: Side,
        pattern: &'a TypePattern,
    ) -> TypePattern {
        match pattern {
            TypePattern::Param(name) => {
                let var = Var {
                    side,
                    name: name.as_str(),
                };
                match self.bindings.get(&var) {
                    Some(term) => self.apply(term.side, term.pattern),
                    None => TypePattern::Param(format!("{}{}", name, side.suffix())),
                }
            }
            TypePattern::Con { ty, args } => TypePattern::Con {
                ty: ty.clone(),
                args: args.iter().map(|a| self.apply(side, a)).collect(),
            },
        }
    }

    /// 沿绑定链查找项的代表
    fn resolve(
        &self,
        mut term: Term<'a>,
    ) -> Term<'a> {
        while let Some(var) = term.var() {
            match self.bindings.get(&var) {
                Some(next) => term = *next,
                None => break,
            }
        }
        term
    }

    /// 变量是否出现在项中（含已绑定的间接出现）
    fn occurs(
        &self,
        var: Var<'a>,
        term: Term<'a>,
    ) -> bool {
        let term = self.resolve(term);
        match term.pattern {
            TypePattern::Param(_) => term.var() == Some(var),
            TypePattern::Con { args, .. } => args.iter().any(|arg| {
                self.occurs(
                    var,
                    Term {
                        side: term.side,
                        pattern: arg,
                    },
                )
            }),
        }
    }

    fn bind(
        &mut self,
        var: Var<'a>,
        term: Term<'a>,
    ) -> bool {
        // 同一侧可能多次出现同一参数（如 `Pair<T, T>`），需要拒绝无限类型
        if self.occurs(var, term) {
            return false;
        }
        self.bindings.insert(var, term);
        true
    }

    fn unify_terms(
        &mut self,
        left: Term<'a>,
        right: Term<'a>,
    ) -> bool {
        let left = self.resolve(left);
        let right = self.resolve(right);

        match (left.var(), right.var()) {
            (Some(l), Some(r)) if l == r => true,
            (Some(l), _) => self.bind(l, right),
            (None, Some(r)) => self.bind(r, left),
            (None, None) => match (left.pattern, right.pattern) {
                (
                    TypePattern::Con { ty: t1, args: a1 },
                    TypePattern::Con { ty: t2, args: a2 },
                ) => {
                    if t1 != t2 || a1.len() != a2.len() {
                        return false;
                    }
                    a1.iter().zip(a2).all(|(x, y)| {
                        self.unify_terms(
                            Term {
                                side: left.side,
                                pattern: x,
                            },
                            Term {
                                side: right.side,
                                pattern: y,
                            },
                        )
                    })
                }
                _ => false,
            },
        }
    }
}

/// 合一两个模式（两侧参数相互独立）
pub fn unify<'a>(
    left: &'a TypePattern,
    right: &'a TypePattern,
) -> Option<Substitution<'a>> {
    let mut subst = Substitution::default();
    let ok = subst.unify_terms(
        Term {
            side: Side::Left,
            pattern: left,
        },
        Term {
            side: Side::Right,
            pattern: right,
        },
    );
    ok.then_some(subst)
}

/// 两个模式是否可能描述同一具体类型
pub fn can_unify(
    left: &TypePattern,
    right: &TypePattern,
) -> bool {
    unify(left, right).is_some()
}
