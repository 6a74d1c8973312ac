//! 模块系统基础类型
//!
//! 管理模块ID、声明（特质、类型、实现）和模块依赖图。
//!
//! # 模块结构
//!
//! - [`graph`] - 模块依赖图
//! - [`collector`] - 可见声明收集器（含循环依赖检测）
//! - [`loader`] - 模块图描述文件加载器
//!
//! 所有声明在创作后不可变，模块的依赖集合在创作时固定。

pub mod collector;
pub mod graph;
pub mod loader;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::traits::pattern::TypePattern;

pub use collector::{collect, CollectError, VisibleSet};
pub use graph::ModuleGraph;
pub use loader::{
    build_graph, load_graph, load_graph_from_str, GraphDescriptor, GraphFormat, ImplDescriptor,
    LoadError, ModuleDescriptor, TraitDescriptor, TypeDescriptor,
};

/// 模块ID - 唯一标识一个模块
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    /// 创建新的模块ID
    pub fn new(id: impl Into<String>) -> Self {
        ModuleId(id.into())
    }

    /// 获取字符串形式
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(id: &str) -> Self {
        ModuleId::new(id)
    }
}

impl From<String> for ModuleId {
    fn from(id: String) -> Self {
        ModuleId(id)
    }
}

/// 类型构造器引用（所属模块 + 名称）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeRef {
    pub module: ModuleId,
    pub name: String,
}

impl TypeRef {
    pub fn new(
        module: impl Into<ModuleId>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }

    /// 解析 `module.Name` 形式的限定名（按最后一个 `.` 拆分）
    pub fn parse_qualified(path: &str) -> Option<Self> {
        let (module, name) = path.rsplit_once('.')?;
        if module.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(module, name))
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}.{}", self.module, self.name)
    }
}

/// 特质引用（所属模块 + 名称）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TraitRef {
    pub module: ModuleId,
    pub name: String,
}

impl TraitRef {
    pub fn new(
        module: impl Into<ModuleId>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for TraitRef {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}.{}", self.module, self.name)
    }
}

/// 实现ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImplId(String);

impl ImplId {
    pub fn new(id: impl Into<String>) -> Self {
        ImplId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImplId {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImplId {
    fn from(id: &str) -> Self {
        ImplId::new(id)
    }
}

/// 特质声明
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitDecl {
    pub name: String,
    pub owner: ModuleId,
    /// 基础特质标记（仅作为数据携带，不参与局部性判定）
    pub fundamental: bool,
}

impl TraitDecl {
    pub fn reference(&self) -> TraitRef {
        TraitRef::new(self.owner.clone(), self.name.clone())
    }
}

/// 类型声明
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,
    pub owner: ModuleId,
    /// 泛型参数个数
    pub arity: usize,
    /// 基础类型标记：单参数包装类型的局部性由其参数决定
    pub fundamental: bool,
}

impl TypeDecl {
    pub fn reference(&self) -> TypeRef {
        TypeRef::new(self.owner.clone(), self.name.clone())
    }
}

/// 特质实现声明：断言 `trait_ref` 对 `pattern` 成立，归属于 `owner`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplDecl {
    pub id: ImplId,
    pub trait_ref: TraitRef,
    pub pattern: TypePattern,
    pub owner: ModuleId,
}

impl ImplDecl {
    /// 实现的去重键 (所属模块, 实现ID)
    pub fn key(&self) -> (ModuleId, ImplId) {
        (self.owner.clone(), self.id.clone())
    }
}

impl std::fmt::Display for ImplDecl {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "{} (impl {} for {} in {})",
            self.id, self.trait_ref, self.pattern, self.owner
        )
    }
}

/// 模块声明
///
/// 模块的声明与依赖列表在创作时确定。放入 [`ModuleGraph`] 之后只以共享引用访问。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDecl {
    pub id: ModuleId,
    /// 直接依赖（有序）
    pub dependencies: Vec<ModuleId>,
    pub traits: Vec<TraitDecl>,
    pub types: Vec<TypeDecl>,
    pub impls: Vec<ImplDecl>,
}

impl ModuleDecl {
    /// 创建空模块
    pub fn new(id: impl Into<ModuleId>) -> Self {
        Self {
            id: id.into(),
            dependencies: Vec::new(),
            traits: Vec::new(),
            types: Vec::new(),
            impls: Vec::new(),
        }
    }

    /// 添加依赖（重复依赖被忽略）
    pub fn depends_on(
        mut self,
        dependency: impl Into<ModuleId>,
    ) -> Self {
        let dependency = dependency.into();
        if !self.dependencies.contains(&dependency) {
            self.dependencies.push(dependency);
        }
        self
    }

    /// 声明特质，返回其引用
    pub fn declare_trait(
        &mut self,
        name: impl Into<String>,
        fundamental: bool,
    ) -> TraitRef {
        let decl = TraitDecl {
            name: name.into(),
            owner: self.id.clone(),
            fundamental,
        };
        let reference = decl.reference();
        self.traits.push(decl);
        reference
    }

    /// 声明类型，返回其引用
    pub fn declare_type(
        &mut self,
        name: impl Into<String>,
        arity: usize,
        fundamental: bool,
    ) -> TypeRef {
        let decl = TypeDecl {
            name: name.into(),
            owner: self.id.clone(),
            arity,
            fundamental,
        };
        let reference = decl.reference();
        self.types.push(decl);
        reference
    }

    /// 声明特质实现，返回其ID
    pub fn declare_impl(
        &mut self,
        id: impl Into<ImplId>,
        trait_ref: TraitRef,
        pattern: TypePattern,
    ) -> ImplId {
        let id = id.into();
        self.impls.push(ImplDecl {
            id: id.clone(),
            trait_ref,
            pattern,
            owner: self.id.clone(),
        });
        id
    }
}

/// 模块图错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
    #[error("module not found: '{0}'")]
    ModuleNotFound(ModuleId),

    #[error("duplicate module: '{0}'")]
    DuplicateModule(ModuleId),

    #[error("cyclic dependency detected: {}", format_cycle(.cycle))]
    CyclicDependency { cycle: Vec<ModuleId> },
}

/// 格式化循环依赖路径 `a -> b -> a`
pub fn format_cycle(cycle: &[ModuleId]) -> String {
    cycle
        .iter()
        .map(ModuleId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}
