//! YaoXiang trait coherence checker
//!
//! Guarantees that for any (trait, type) combination at most one applicable
//! implementation exists across a program, using only information local to the
//! module under check and its transitive dependencies.
//!
//! # Example
//!
//! ```
//! use yaoxiang_coherence::module::{ModuleDecl, ModuleGraph, ModuleId};
//! use yaoxiang_coherence::traits::{CoherenceChecker, TypePattern};
//!
//! let mut core = ModuleDecl::new("core");
//! let show = core.declare_trait("Show", false);
//! let mut app = ModuleDecl::new("app").depends_on("core");
//! let ty = app.declare_type("AppType", 0, false);
//! app.declare_impl("show_app", show, TypePattern::named(ty));
//!
//! let graph = ModuleGraph::new().with_module(core)?.with_module(app)?;
//! let report = CoherenceChecker::new().check(&graph, &ModuleId::new("app"));
//! assert!(!report.has_errors(false));
//! # Ok::<(), yaoxiang_coherence::module::ModuleError>(())
//! ```

#![doc(html_root_url = "https://docs.rs/yaoxiang-coherence")]
#![warn(rust_2018_idioms)]

// Public modules
pub mod module;
pub mod traits;

// Utility modules
pub mod util;

// Re-exports
pub use anyhow::{Context, Result};

use std::path::Path;

use tracing::debug;

use crate::module::{ModuleGraph, ModuleId};
use crate::traits::{CoherenceChecker, Report};
use crate::util::config::CoherenceConfig;

/// Checker version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Checker name
pub const NAME: &str = "YaoXiang (爻象) trait coherence checker";

/// 按配置检查图中的模块
///
/// `modules` 为空时检查全部模块：无环时按拓扑顺序（依赖在前），
/// 否则按声明顺序。
pub fn check_graph(
    graph: &ModuleGraph,
    modules: &[ModuleId],
    config: &CoherenceConfig,
) -> Result<Vec<Report>> {
    let checker = CoherenceChecker::new().with_fundamentals(config.fundamental_types()?);

    let targets = if modules.is_empty() {
        graph
            .topological_sort()
            .unwrap_or_else(|_| graph.module_ids())
    } else {
        modules.to_vec()
    };

    debug!(modules = targets.len(), parallel = config.check.parallel, "checking graph");
    Ok(checker.check_all(graph, &targets, config.check.parallel))
}

/// 加载描述文件并检查
pub fn check_graph_file(
    path: &Path,
    modules: &[ModuleId],
    config: &CoherenceConfig,
) -> Result<Vec<Report>> {
    let graph = module::load_graph(path)
        .with_context(|| format!("Failed to load module graph: {}", path.display()))?;
    check_graph(&graph, modules, config)
}
