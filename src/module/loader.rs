//! 模块图描述文件加载器
//!
//! 从 JSON（默认）或 RON 描述文件物化 [`ModuleGraph`]。
//!
//! 描述文件示例：
//!
//! ```json
//! {
//!   "modules": [
//!     { "id": "core", "traits": [{ "name": "Show" }], "types": [{ "name": "Id" }] },
//!     {
//!       "id": "app",
//!       "deps": ["core"],
//!       "types": [{ "name": "AppType" }],
//!       "impls": [{ "trait": "Show", "for": "AppType" }]
//!     }
//!   ]
//! }
//! ```
//!
//! 名称解析：实现的 `params` 中列出的名称是自由参数；其余名称先在本模块查找，
//! 再在传递依赖中查找唯一声明。`module.Name` 形式直接指定所属模块。
//! 依赖缺失或成环不在此处报错，留给收集阶段报告。

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::traits::pattern::{parse_pattern, PatternAst, PatternError, TypePattern};

use super::{ImplId, ModuleDecl, ModuleError, ModuleGraph, ModuleId, TraitRef, TypeRef};

/// 描述文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    Json,
    Ron,
}

impl GraphFormat {
    /// 按扩展名判断格式；`.ron` 以外一律视为 JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("ron") => GraphFormat::Ron,
            _ => GraphFormat::Json,
        }
    }
}

/// 模块图描述
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDescriptor {
    #[serde(default)]
    pub modules: Vec<ModuleDescriptor>,
}

/// 模块描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub id: String,
    #[serde(default)]
    pub deps: Vec<String>,
    #[serde(default)]
    pub traits: Vec<TraitDescriptor>,
    #[serde(default)]
    pub types: Vec<TypeDescriptor>,
    #[serde(default)]
    pub impls: Vec<ImplDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitDescriptor {
    pub name: String,
    #[serde(default)]
    pub fundamental: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub name: String,
    #[serde(default)]
    pub arity: usize,
    #[serde(default)]
    pub fundamental: bool,
}

/// 实现描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplDescriptor {
    /// 缺省为 `<module>#<index>`
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "trait")]
    pub trait_name: String,
    /// 自由参数名
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(rename = "for")]
    pub pattern: String,
}

/// 加载错误
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON descriptor: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid RON descriptor: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error(transparent)]
    Graph(#[from] ModuleError),

    #[error("duplicate implementation id '{impl_id}' in module '{module}'")]
    DuplicateImpl { module: ModuleId, impl_id: ImplId },

    #[error("malformed pattern '{pattern}' for '{impl_id}' in module '{module}': {source}")]
    Pattern {
        module: ModuleId,
        impl_id: ImplId,
        pattern: String,
        #[source]
        source: PatternError,
    },

    #[error("unknown trait '{name}' referenced from module '{module}'")]
    UnknownTrait { module: ModuleId, name: String },

    #[error("ambiguous trait '{name}' in module '{module}', declared by: {}", join(.candidates))]
    AmbiguousTrait {
        module: ModuleId,
        name: String,
        candidates: Vec<ModuleId>,
    },

    #[error("unknown type '{name}' referenced from module '{module}'")]
    UnknownType { module: ModuleId, name: String },

    #[error("ambiguous type '{name}' in module '{module}', declared by: {}", join(.candidates))]
    AmbiguousType {
        module: ModuleId,
        name: String,
        candidates: Vec<ModuleId>,
    },

    #[error("type '{ty}' expects {expected} argument(s), found {found} in '{impl_id}'")]
    ArityMismatch {
        impl_id: ImplId,
        ty: TypeRef,
        expected: usize,
        found: usize,
    },

    #[error("parameter '{name}' cannot take arguments in '{impl_id}'")]
    ParamApplied { impl_id: ImplId, name: String },
}

fn join(modules: &[ModuleId]) -> String {
    modules
        .iter()
        .map(ModuleId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// 从文件加载模块图
pub fn load_graph(path: &Path) -> Result<ModuleGraph, LoadError> {
    let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loading module graph");
    load_graph_from_str(&source, GraphFormat::from_path(path))
}

/// 从文本加载模块图
pub fn load_graph_from_str(
    source: &str,
    format: GraphFormat,
) -> Result<ModuleGraph, LoadError> {
    let descriptor: GraphDescriptor = match format {
        GraphFormat::Json => serde_json::from_str(source)?,
        GraphFormat::Ron => ron::from_str(source)?,
    };
    build_graph(&descriptor)
}

/// 解析名称并构建模块图
pub fn build_graph(descriptor: &GraphDescriptor) -> Result<ModuleGraph, LoadError> {
    let mut index: IndexMap<ModuleId, &ModuleDescriptor> = IndexMap::new();
    for module in &descriptor.modules {
        let id = ModuleId::new(module.id.as_str());
        if index.contains_key(&id) {
            return Err(ModuleError::DuplicateModule(id).into());
        }
        index.insert(id, module);
    }

    let resolver = Resolver { index: &index };
    let mut graph = ModuleGraph::new();
    for (id, module) in &index {
        graph.add_module(resolver.build_module(id, module)?)?;
    }

    debug!(modules = graph.len(), "module graph loaded");
    Ok(graph)
}

/// 名称查找结果
enum Lookup<T> {
    Found(ModuleId, T),
    Missing,
    Ambiguous(Vec<ModuleId>),
}

/// 名称解析作用域：模块自身及其传递依赖
struct Scope<'r> {
    module: &'r ModuleId,
    deps: Vec<ModuleId>,
}

struct Resolver<'d> {
    index: &'d IndexMap<ModuleId, &'d ModuleDescriptor>,
}

impl<'d> Resolver<'d> {
    fn build_module(
        &self,
        id: &ModuleId,
        module: &ModuleDescriptor,
    ) -> Result<ModuleDecl, LoadError> {
        let mut decl = ModuleDecl::new(id.clone());
        for dep in &module.deps {
            decl = decl.depends_on(dep.as_str());
        }
        for t in &module.traits {
            decl.declare_trait(t.name.as_str(), t.fundamental);
        }
        for t in &module.types {
            decl.declare_type(t.name.as_str(), t.arity, t.fundamental);
        }

        let scope = Scope {
            module: id,
            deps: self.transitive_deps(id),
        };
        let mut seen: HashSet<ImplId> = HashSet::new();
        for (index, imp) in module.impls.iter().enumerate() {
            let impl_id = match &imp.id {
                Some(explicit) => ImplId::new(explicit.as_str()),
                None => ImplId::new(format!("{}#{}", id, index)),
            };
            if !seen.insert(impl_id.clone()) {
                return Err(LoadError::DuplicateImpl {
                    module: id.clone(),
                    impl_id,
                });
            }

            let trait_ref = self.resolve_trait(&scope, &imp.trait_name)?;
            let ast = parse_pattern(&imp.pattern).map_err(|source| LoadError::Pattern {
                module: id.clone(),
                impl_id: impl_id.clone(),
                pattern: imp.pattern.clone(),
                source,
            })?;
            let pattern = self.resolve_pattern(&scope, &impl_id, &imp.params, &ast)?;
            decl.declare_impl(impl_id, trait_ref, pattern);
        }
        Ok(decl)
    }

    /// 广度优先的传递依赖（不含自身，缺失的模块被跳过）
    fn transitive_deps(
        &self,
        root: &ModuleId,
    ) -> Vec<ModuleId> {
        let mut visited: HashSet<&ModuleId> = HashSet::new();
        visited.insert(root);
        let mut order = Vec::new();
        let mut queue: VecDeque<&ModuleId> = VecDeque::new();
        queue.push_back(root);

        while let Some(current) = queue.pop_front() {
            let Some((_, module)) = self.index.get_key_value(current) else {
                continue;
            };
            for dep in &module.deps {
                let Some((key, _)) = self.index.get_key_value(&ModuleId::new(dep.as_str())) else {
                    continue;
                };
                if visited.insert(key) {
                    order.push(key.clone());
                    queue.push_back(key);
                }
            }
        }
        order
    }

    fn lookup<T>(
        &self,
        scope: &Scope<'_>,
        path: &str,
        find: impl Fn(&ModuleDescriptor, &str) -> Option<T>,
    ) -> Lookup<T> {
        if let Some((module, name)) = path.rsplit_once('.') {
            let module = ModuleId::new(module);
            if &module != scope.module && !scope.deps.contains(&module) {
                return Lookup::Missing;
            }
            return match self.index.get(&module).copied().and_then(|m| find(m, name)) {
                Some(found) => Lookup::Found(module, found),
                None => Lookup::Missing,
            };
        }

        if let Some(found) = self.index.get(scope.module).copied().and_then(|m| find(m, path)) {
            return Lookup::Found(scope.module.clone(), found);
        }

        let mut matches: Vec<(ModuleId, T)> = scope
            .deps
            .iter()
            .filter_map(|dep| {
                let found = self.index.get(dep).copied().and_then(|m| find(m, path))?;
                Some((dep.clone(), found))
            })
            .collect();
        match matches.len() {
            0 => Lookup::Missing,
            1 => {
                let (module, found) = matches.remove(0);
                Lookup::Found(module, found)
            }
            _ => Lookup::Ambiguous(matches.into_iter().map(|(module, _)| module).collect()),
        }
    }

    fn resolve_trait(
        &self,
        scope: &Scope<'_>,
        path: &str,
    ) -> Result<TraitRef, LoadError> {
        let found = self.lookup(scope, path, |module, name| {
            module
                .traits
                .iter()
                .find(|t| t.name == name)
                .map(|t| t.name.clone())
        });
        match found {
            Lookup::Found(owner, name) => Ok(TraitRef::new(owner, name)),
            Lookup::Missing => Err(LoadError::UnknownTrait {
                module: scope.module.clone(),
                name: path.to_string(),
            }),
            Lookup::Ambiguous(candidates) => Err(LoadError::AmbiguousTrait {
                module: scope.module.clone(),
                name: path.to_string(),
                candidates,
            }),
        }
    }

    fn resolve_pattern(
        &self,
        scope: &Scope<'_>,
        impl_id: &ImplId,
        params: &[String],
        ast: &PatternAst,
    ) -> Result<TypePattern, LoadError> {
        if params.iter().any(|p| *p == ast.path) {
            if !ast.args.is_empty() {
                return Err(LoadError::ParamApplied {
                    impl_id: impl_id.clone(),
                    name: ast.path.clone(),
                });
            }
            return Ok(TypePattern::param(ast.path.as_str()));
        }

        let found = self.lookup(scope, &ast.path, |module, name| {
            module
                .types
                .iter()
                .find(|t| t.name == name)
                .map(|t| (t.name.clone(), t.arity))
        });
        let (ty, arity) = match found {
            Lookup::Found(owner, (name, arity)) => (TypeRef::new(owner, name), arity),
            Lookup::Missing => {
                return Err(LoadError::UnknownType {
                    module: scope.module.clone(),
                    name: ast.path.clone(),
                })
            }
            Lookup::Ambiguous(candidates) => {
                return Err(LoadError::AmbiguousType {
                    module: scope.module.clone(),
                    name: ast.path.clone(),
                    candidates,
                })
            }
        };

        if ast.args.len() != arity {
            return Err(LoadError::ArityMismatch {
                impl_id: impl_id.clone(),
                ty,
                expected: arity,
                found: ast.args.len(),
            });
        }

        let args = ast
            .args
            .iter()
            .map(|arg| self.resolve_pattern(scope, impl_id, params, arg))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TypePattern::con(ty, args))
    }
}
