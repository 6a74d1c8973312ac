//! 类型模式
//!
//! 类型模式由类型构造器和自由参数组成，例如 `Wrap<X>`。
//! 最外层构造器称为模式的头部类型。
//!
//! 本模块同时提供模式的文本语法解析（[`parse_pattern`]），产出未解析名称的
//! [`PatternAst`]；名称到 [`TypeRef`] 的解析由加载器完成。

use std::collections::HashMap;

use thiserror::Error;

use crate::module::TypeRef;

/// 已解析的类型模式
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypePattern {
    /// 自由参数占位符
    Param(String),
    /// 类型构造器应用
    Con { ty: TypeRef, args: Vec<TypePattern> },
}

impl TypePattern {
    /// 创建自由参数
    pub fn param(name: impl Into<String>) -> Self {
        TypePattern::Param(name.into())
    }

    /// 创建构造器应用
    pub fn con(
        ty: TypeRef,
        args: Vec<TypePattern>,
    ) -> Self {
        TypePattern::Con { ty, args }
    }

    /// 创建无参数构造器
    pub fn named(ty: TypeRef) -> Self {
        TypePattern::Con { ty, args: Vec::new() }
    }

    /// 头部类型；毯式模式（裸参数）没有头部
    pub fn head(&self) -> Option<&TypeRef> {
        match self {
            TypePattern::Param(_) => None,
            TypePattern::Con { ty, .. } => Some(ty),
        }
    }

    /// 构造器参数
    pub fn args(&self) -> &[TypePattern] {
        match self {
            TypePattern::Param(_) => &[],
            TypePattern::Con { args, .. } => args,
        }
    }

    /// 是否不含自由参数
    pub fn is_ground(&self) -> bool {
        match self {
            TypePattern::Param(_) => false,
            TypePattern::Con { args, .. } => args.iter().all(TypePattern::is_ground),
        }
    }

    /// 按首次出现顺序列出自由参数（去重）
    pub fn params(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_params(&mut out);
        out
    }

    fn collect_params<'a>(
        &'a self,
        out: &mut Vec<&'a str>,
    ) {
        match self {
            TypePattern::Param(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            TypePattern::Con { args, .. } => {
                for arg in args {
                    arg.collect_params(out);
                }
            }
        }
    }

    /// 结构相同（允许参数一致重命名）
    ///
    /// `Wrap<T>` 与 `Wrap<U>` 相同；`Pair<T, T>` 与 `Pair<T, U>` 不同。
    pub fn is_identical(
        &self,
        other: &TypePattern,
    ) -> bool {
        let mut forward = HashMap::new();
        let mut backward = HashMap::new();
        Self::identical_rec(self, other, &mut forward, &mut backward)
    }

    fn identical_rec<'a>(
        left: &'a TypePattern,
        right: &'a TypePattern,
        forward: &mut HashMap<&'a str, &'a str>,
        backward: &mut HashMap<&'a str, &'a str>,
    ) -> bool {
        match (left, right) {
            (TypePattern::Param(l), TypePattern::Param(r)) => {
                let f = *forward.entry(l.as_str()).or_insert(r.as_str());
                let b = *backward.entry(r.as_str()).or_insert(l.as_str());
                f == r.as_str() && b == l.as_str()
            }
            (TypePattern::Con { ty: t1, args: a1 }, TypePattern::Con { ty: t2, args: a2 }) => {
                t1 == t2
                    && a1.len() == a2.len()
                    && a1
                        .iter()
                        .zip(a2)
                        .all(|(l, r)| Self::identical_rec(l, r, forward, backward))
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for TypePattern {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            TypePattern::Param(name) => f.write_str(name),
            TypePattern::Con { ty, args } => {
                write!(f, "{}", ty)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
        }
    }
}

/// 模式语法树（名称未解析）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternAst {
    /// 名称，可带模块限定（`core.Box`）
    pub path: String,
    pub args: Vec<PatternAst>,
}

impl PatternAst {
    /// 限定名拆分为 (模块, 名称)
    pub fn split_path(&self) -> (Option<&str>, &str) {
        match self.path.rsplit_once('.') {
            Some((module, name)) => (Some(module), name),
            None => (None, &self.path),
        }
    }
}

/// 模式语法错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("unexpected end of pattern")]
    UnexpectedEnd,

    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("mismatched delimiter at offset {offset}: expected '{expected}', found '{found}'")]
    MismatchedDelimiter {
        expected: char,
        found: char,
        offset: usize,
    },

    #[error("empty argument list at offset {offset}")]
    EmptyArguments { offset: usize },

    #[error("trailing input at offset {offset}")]
    TrailingInput { offset: usize },
}

/// 解析模式文本
///
/// 语法：`pattern := path (('<' | '[') pattern (',' pattern)* ('>' | ']'))?`，
/// `path := ident ('.' ident)*`。两种括号不可混用。
pub fn parse_pattern(source: &str) -> Result<PatternAst, PatternError> {
    let mut parser = PatternParser {
        chars: source.char_indices().collect(),
        pos: 0,
    };
    let ast = parser.pattern()?;
    parser.skip_ws();
    if let Some(&(offset, _)) = parser.chars.get(parser.pos) {
        return Err(PatternError::TrailingInput { offset });
    }
    Ok(ast)
}

struct PatternParser {
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl PatternParser {
    fn peek(&self) -> Option<(usize, char)> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some((_, c)) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn pattern(&mut self) -> Result<PatternAst, PatternError> {
        self.skip_ws();
        let path = self.path()?;
        self.skip_ws();

        let close = match self.peek() {
            Some((_, '<')) => '>',
            Some((_, '[')) => ']',
            _ => return Ok(PatternAst { path, args: Vec::new() }),
        };
        self.pos += 1;

        self.skip_ws();
        if let Some((offset, c)) = self.peek() {
            if c == close {
                return Err(PatternError::EmptyArguments { offset });
            }
        }

        let mut args = vec![self.pattern()?];
        loop {
            self.skip_ws();
            match self.peek() {
                Some((_, ',')) => {
                    self.pos += 1;
                    args.push(self.pattern()?);
                }
                Some((_, c)) if c == close => {
                    self.pos += 1;
                    return Ok(PatternAst { path, args });
                }
                Some((offset, c @ ('>' | ']'))) => {
                    return Err(PatternError::MismatchedDelimiter {
                        expected: close,
                        found: c,
                        offset,
                    });
                }
                Some((offset, ch)) => return Err(PatternError::UnexpectedChar { ch, offset }),
                None => return Err(PatternError::UnexpectedEnd),
            }
        }
    }

    fn path(&mut self) -> Result<String, PatternError> {
        let mut path = self.ident()?;
        while let Some((_, '.')) = self.peek() {
            self.pos += 1;
            path.push('.');
            path.push_str(&self.ident()?);
        }
        Ok(path)
    }

    fn ident(&mut self) -> Result<String, PatternError> {
        let (offset, first) = self.peek().ok_or(PatternError::UnexpectedEnd)?;
        if !(first == '_' || unicode_ident::is_xid_start(first)) {
            return Err(PatternError::UnexpectedChar { ch: first, offset });
        }
        let mut ident = String::new();
        ident.push(first);
        self.pos += 1;
        while let Some((_, c)) = self.peek() {
            if !unicode_ident::is_xid_continue(c) {
                break;
            }
            ident.push(c);
            self.pos += 1;
        }
        Ok(ident)
    }
}
