//! 可见声明收集器
//!
//! 对依赖关系做深度优先遍历，汇总模块自身及其全部传递依赖的声明。
//! 遍历使用递归栈标记，遇到回边即报告完整的循环路径。
//!
//! 收集结果是快照：[`VisibleSet`] 持有声明的副本，之后对图的任何修改都不会影响它。

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;
use tracing::trace;

use super::{
    format_cycle, ImplDecl, ImplId, ModuleDecl, ModuleGraph, ModuleId, TraitDecl, TraitRef,
    TypeDecl, TypeRef,
};

/// 收集失败（致命，整个模块无法检查）
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "error")]
pub enum CollectError {
    /// 依赖关系存在回边；路径首尾为同一模块
    #[error("cyclic dependency detected: {}", format_cycle(.cycle))]
    CyclicDependency { cycle: Vec<ModuleId> },

    /// 依赖指向图中不存在的模块
    #[error("module not found: '{module}'")]
    UnknownModule {
        module: ModuleId,
        referenced_by: Option<ModuleId>,
    },
}

/// 模块可见的声明集合
///
/// 按 (所属模块, 标识符) 去重，保持遍历顺序：模块自身在前，
/// 之后按声明顺序深度优先展开依赖。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleSet {
    root: ModuleId,
    modules: Vec<ModuleId>,
    traits: IndexMap<TraitRef, TraitDecl>,
    types: IndexMap<TypeRef, TypeDecl>,
    impls: IndexMap<(ModuleId, ImplId), ImplDecl>,
}

impl VisibleSet {
    fn new(root: ModuleId) -> Self {
        Self {
            root,
            modules: Vec::new(),
            traits: IndexMap::new(),
            types: IndexMap::new(),
            impls: IndexMap::new(),
        }
    }

    fn absorb(
        &mut self,
        module: &ModuleDecl,
    ) {
        self.modules.push(module.id.clone());
        for decl in &module.traits {
            self.traits
                .entry(decl.reference())
                .or_insert_with(|| decl.clone());
        }
        for decl in &module.types {
            self.types
                .entry(decl.reference())
                .or_insert_with(|| decl.clone());
        }
        for decl in &module.impls {
            self.impls.entry(decl.key()).or_insert_with(|| decl.clone());
        }
    }

    /// 被检查的模块
    pub fn root(&self) -> &ModuleId {
        &self.root
    }

    /// 可见模块（遍历顺序，根模块在首位）
    pub fn modules(&self) -> &[ModuleId] {
        &self.modules
    }

    pub fn traits(&self) -> impl Iterator<Item = &TraitDecl> {
        self.traits.values()
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDecl> {
        self.types.values()
    }

    pub fn impls(&self) -> impl Iterator<Item = &ImplDecl> {
        self.impls.values()
    }

    /// 根模块自身声明的实现（声明顺序）
    pub fn local_impls(&self) -> impl Iterator<Item = &ImplDecl> {
        self.impls.values().filter(|i| i.owner == self.root)
    }

    /// 从依赖继承的实现
    pub fn inherited_impls(&self) -> impl Iterator<Item = &ImplDecl> {
        self.impls.values().filter(|i| i.owner != self.root)
    }
}

/// 遍历标记
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    /// 在递归栈上
    InProgress,
    /// 已完成
    Done,
}

/// 收集模块可见的全部声明
pub fn collect(
    graph: &ModuleGraph,
    module: &ModuleId,
) -> Result<VisibleSet, CollectError> {
    let root = graph
        .get(module)
        .ok_or_else(|| CollectError::UnknownModule {
            module: module.clone(),
            referenced_by: None,
        })?;

    let mut collector = Collector {
        graph,
        marks: HashMap::new(),
        stack: Vec::new(),
        visible: VisibleSet::new(module.clone()),
    };
    collector.visit(root)?;

    trace!(
        module = %module,
        modules = collector.visible.modules.len(),
        impls = collector.visible.impls.len(),
        "collected visible declarations"
    );
    Ok(collector.visible)
}

struct Collector<'g> {
    graph: &'g ModuleGraph,
    marks: HashMap<&'g ModuleId, Mark>,
    stack: Vec<&'g ModuleId>,
    visible: VisibleSet,
}

impl<'g> Collector<'g> {
    fn visit(
        &mut self,
        module: &'g ModuleDecl,
    ) -> Result<(), CollectError> {
        self.marks.insert(&module.id, Mark::InProgress);
        self.stack.push(&module.id);
        self.visible.absorb(module);

        for dep in &module.dependencies {
            match self.marks.get(dep) {
                Some(Mark::Done) => continue,
                Some(Mark::InProgress) => return Err(self.cycle_to(dep)),
                None => {}
            }
            let decl = self
                .graph
                .get(dep)
                .ok_or_else(|| CollectError::UnknownModule {
                    module: dep.clone(),
                    referenced_by: Some(module.id.clone()),
                })?;
            self.visit(decl)?;
        }

        self.stack.pop();
        self.marks.insert(&module.id, Mark::Done);
        Ok(())
    }

    /// 从递归栈中截取以 `target` 开始的循环
    fn cycle_to(
        &self,
        target: &ModuleId,
    ) -> CollectError {
        let start = self
            .stack
            .iter()
            .position(|id| *id == target)
            .unwrap_or(0);
        let mut cycle: Vec<ModuleId> = self.stack[start..].iter().map(|id| (*id).clone()).collect();
        cycle.push(target.clone());
        CollectError::CyclicDependency { cycle }
    }
}
