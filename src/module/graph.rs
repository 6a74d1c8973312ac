//! 模块依赖图
//!
//! 保存外部加载器物化后的全部模块声明。图按插入顺序保存模块，
//! 所有查询只返回共享引用，已加入的声明不会再被修改。

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;

use super::{ModuleDecl, ModuleError, ModuleId};

/// 模块依赖图
#[derive(Debug, Clone, Default)]
pub struct ModuleGraph {
    /// 模块节点映射（保持插入顺序）
    modules: IndexMap<ModuleId, ModuleDecl>,
}

impl ModuleGraph {
    /// 创建新的模块图
    pub fn new() -> Self {
        Self {
            modules: IndexMap::new(),
        }
    }

    /// 添加模块
    ///
    /// 依赖可以引用尚未添加的模块，缺失的依赖在收集阶段报告。
    pub fn add_module(
        &mut self,
        module: ModuleDecl,
    ) -> Result<(), ModuleError> {
        if self.modules.contains_key(&module.id) {
            return Err(ModuleError::DuplicateModule(module.id));
        }
        self.modules.insert(module.id.clone(), module);
        Ok(())
    }

    /// 链式添加模块
    pub fn with_module(
        mut self,
        module: ModuleDecl,
    ) -> Result<Self, ModuleError> {
        self.add_module(module)?;
        Ok(self)
    }

    /// 获取模块
    pub fn get(
        &self,
        id: &ModuleId,
    ) -> Option<&ModuleDecl> {
        self.modules.get(id)
    }

    /// 检查模块是否存在
    pub fn contains(
        &self,
        id: &ModuleId,
    ) -> bool {
        self.modules.contains_key(id)
    }

    /// 按插入顺序遍历模块
    pub fn modules(&self) -> impl Iterator<Item = &ModuleDecl> {
        self.modules.values()
    }

    /// 所有模块ID（插入顺序）
    pub fn module_ids(&self) -> Vec<ModuleId> {
        self.modules.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// 获取模块的直接依赖
    pub fn dependencies(
        &self,
        id: &ModuleId,
    ) -> Result<&[ModuleId], ModuleError> {
        self.modules
            .get(id)
            .map(|m| m.dependencies.as_slice())
            .ok_or_else(|| ModuleError::ModuleNotFound(id.clone()))
    }

    /// 获取直接依赖该模块的所有模块
    pub fn dependents(
        &self,
        id: &ModuleId,
    ) -> Vec<ModuleId> {
        self.modules
            .values()
            .filter(|m| m.dependencies.contains(id))
            .map(|m| m.id.clone())
            .collect()
    }

    /// 拓扑排序
    ///
    /// 返回的顺序保证依赖出现在依赖者之前。引用了图外模块的边被忽略，
    /// 由收集器负责报告。
    pub fn topological_sort(&self) -> Result<Vec<ModuleId>, ModuleError> {
        // 入度 = 尚未处理的图内依赖个数
        let mut in_degree: HashMap<&ModuleId, usize> = self
            .modules
            .values()
            .map(|m| {
                let known = m
                    .dependencies
                    .iter()
                    .filter(|d| self.modules.contains_key(*d))
                    .collect::<HashSet<_>>()
                    .len();
                (&m.id, known)
            })
            .collect();

        let mut dependents: HashMap<&ModuleId, Vec<&ModuleId>> = HashMap::new();
        for module in self.modules.values() {
            let unique: HashSet<&ModuleId> = module.dependencies.iter().collect();
            for dep in unique {
                if self.modules.contains_key(dep) {
                    dependents.entry(dep).or_default().push(&module.id);
                }
            }
        }

        // Kahn 算法；按插入顺序入队以保证结果确定
        let mut queue: VecDeque<&ModuleId> = self
            .modules
            .keys()
            .filter(|id| in_degree.get(id).copied() == Some(0))
            .collect();
        let mut sorted = Vec::with_capacity(self.modules.len());

        while let Some(id) = queue.pop_front() {
            sorted.push(id.clone());
            if let Some(users) = dependents.get(id) {
                for user in users {
                    if let Some(deg) = in_degree.get_mut(user) {
                        *deg -= 1;
                        if *deg == 0 {
                            queue.push_back(*user);
                        }
                    }
                }
            }
        }

        if sorted.len() != self.modules.len() {
            let cycle = self.detect_cycles().unwrap_or_default();
            return Err(ModuleError::CyclicDependency { cycle });
        }

        Ok(sorted)
    }

    /// 检测整个图中的循环依赖
    ///
    /// 返回检测到的第一个循环路径（首尾为同一模块）
    pub fn detect_cycles(&self) -> Option<Vec<ModuleId>> {
        let mut visited: HashSet<&ModuleId> = HashSet::new();
        let mut stack: Vec<&ModuleId> = Vec::new();

        for id in self.modules.keys() {
            if !visited.contains(id) {
                if let Some(cycle) = self.detect_cycles_dfs(id, &mut visited, &mut stack) {
                    return Some(cycle);
                }
            }
        }

        None
    }

    fn detect_cycles_dfs<'a>(
        &'a self,
        node: &'a ModuleId,
        visited: &mut HashSet<&'a ModuleId>,
        stack: &mut Vec<&'a ModuleId>,
    ) -> Option<Vec<ModuleId>> {
        visited.insert(node);
        stack.push(node);

        if let Some(module) = self.modules.get(node) {
            for neighbor in &module.dependencies {
                if let Some(pos) = stack.iter().position(|s| *s == neighbor) {
                    let mut cycle: Vec<ModuleId> =
                        stack[pos..].iter().map(|id| (*id).clone()).collect();
                    cycle.push(neighbor.clone());
                    return Some(cycle);
                }
                if !visited.contains(neighbor) {
                    if let Some(cycle) = self.detect_cycles_dfs(neighbor, visited, stack) {
                        return Some(cycle);
                    }
                }
            }
        }

        stack.pop();
        None
    }
}
