//! 模块图与可见声明收集测试


use crate::module::{
    collect, CollectError, ModuleDecl, ModuleError, ModuleGraph, ModuleId, TypeRef,
};
use crate::traits::pattern::TypePattern;

fn id(name: &str) -> ModuleId {
    ModuleId::new(name)
}

/// 只有依赖、没有声明的模块图；依赖以空格分隔
fn chain(edges: &[(&str, &str)]) -> ModuleGraph {
    let mut graph = ModuleGraph::new();
    for (name, deps) in edges {
        let mut module = ModuleDecl::new(*name);
        for dep in deps.split_whitespace() {
            module = module.depends_on(dep);
        }
        graph.add_module(module).unwrap();
    }
    graph
}

#[test]
fn test_type_ref_parse_qualified() {
    assert_eq!(
        TypeRef::parse_qualified("core.Box"),
        Some(TypeRef::new("core", "Box"))
    );
    // 按最后一个 `.` 拆分
    assert_eq!(
        TypeRef::parse_qualified("std.io.Ref"),
        Some(TypeRef::new("std.io", "Ref"))
    );
    assert_eq!(TypeRef::parse_qualified("Box"), None);
    assert_eq!(TypeRef::parse_qualified(".Box"), None);
    assert_eq!(TypeRef::new("core", "Id").to_string(), "core.Id");
}

#[test]
fn test_depends_on_ignores_duplicates() {
    let module = ModuleDecl::new("app").depends_on("core").depends_on("core");
    assert_eq!(module.dependencies, vec![id("core")]);
}

#[test]
fn test_duplicate_module_rejected() {
    let mut graph = ModuleGraph::new();
    graph.add_module(ModuleDecl::new("a")).unwrap();
    assert_eq!(
        graph.add_module(ModuleDecl::new("a")),
        Err(ModuleError::DuplicateModule(id("a")))
    );
    assert_eq!(graph.len(), 1);
}

#[test]
fn test_dependencies_and_dependents() {
    let graph = chain(&[("c", ""), ("b", "c"), ("a", "b c")]);

    assert_eq!(graph.dependencies(&id("a")).unwrap(), &[id("b"), id("c")]);
    assert_eq!(graph.dependents(&id("c")), vec![id("b"), id("a")]);
    assert_eq!(
        graph.dependencies(&id("zzz")),
        Err(ModuleError::ModuleNotFound(id("zzz")))
    );
}

#[test]
fn test_topological_sort() {
    // a 依赖 b，b 依赖 c；插入顺序与依赖顺序相反
    let graph = chain(&[("a", "b"), ("b", "c"), ("c", "")]);

    let sorted = graph.topological_sort().unwrap();
    assert_eq!(sorted, vec![id("c"), id("b"), id("a")]);
}

#[test]
fn test_topological_sort_ignores_missing_modules() {
    let graph = chain(&[("a", "ghost"), ("b", "a")]);
    assert_eq!(graph.topological_sort().unwrap(), vec![id("a"), id("b")]);
}

#[test]
fn test_topological_sort_reports_cycle() {
    let graph = chain(&[("x", "y"), ("y", "z"), ("z", "x")]);

    match graph.topological_sort() {
        Err(ModuleError::CyclicDependency { cycle }) => {
            assert_eq!(cycle, vec![id("x"), id("y"), id("z"), id("x")]);
        }
        other => panic!("expected cycle, got {:?}", other),
    }
}

#[test]
fn test_detect_cycles_none() {
    let graph = chain(&[("c", ""), ("b", "c"), ("a", "b c")]);
    assert!(graph.detect_cycles().is_none());
}

#[test]
fn test_collect_transitive() {
    let mut core = ModuleDecl::new("core");
    let show = core.declare_trait("Show", false);
    let id_ty = core.declare_type("Id", 0, false);
    core.declare_impl("show_id", show.clone(), TypePattern::named(id_ty));

    let mut ext = ModuleDecl::new("ext").depends_on("core");
    ext.declare_type("Widget", 0, false);

    let mut app = ModuleDecl::new("app").depends_on("ext");
    let app_ty = app.declare_type("AppType", 0, false);
    app.declare_impl("show_app", show, TypePattern::named(app_ty));

    let graph = ModuleGraph::new()
        .with_module(core)
        .and_then(|g| g.with_module(ext))
        .and_then(|g| g.with_module(app))
        .unwrap();

    let visible = collect(&graph, &id("app")).unwrap();
    assert_eq!(visible.root(), &id("app"));
    assert_eq!(visible.modules(), &[id("app"), id("ext"), id("core")]);
    assert_eq!(visible.traits().count(), 1);
    assert_eq!(visible.types().count(), 3);
    assert!(visible
        .types()
        .any(|t| t.reference() == TypeRef::new("ext", "Widget")));

    let local: Vec<_> = visible.local_impls().map(|i| i.id.as_str()).collect();
    let inherited: Vec<_> = visible.inherited_impls().map(|i| i.id.as_str()).collect();
    assert_eq!(local, vec!["show_app"]);
    assert_eq!(inherited, vec!["show_id"]);
}

#[test]
fn test_collect_diamond_visits_once() {
    let mut base = ModuleDecl::new("base");
    let t = base.declare_trait("T", false);
    let ty = base.declare_type("B", 0, false);
    base.declare_impl("t_b", t, TypePattern::named(ty));

    let graph = ModuleGraph::new()
        .with_module(base)
        .and_then(|g| g.with_module(ModuleDecl::new("left").depends_on("base")))
        .and_then(|g| g.with_module(ModuleDecl::new("right").depends_on("base")))
        .and_then(|g| {
            g.with_module(ModuleDecl::new("top").depends_on("left").depends_on("right"))
        })
        .unwrap();

    let visible = collect(&graph, &id("top")).unwrap();
    assert_eq!(
        visible.modules(),
        &[id("top"), id("left"), id("base"), id("right")]
    );
    assert_eq!(visible.impls().count(), 1);
}

#[test]
fn test_collect_cycle_for_every_module_on_or_above_it() {
    // x -> y -> z -> x，w 建立在 x 之上
    let graph = chain(&[("x", "y"), ("y", "z"), ("z", "x"), ("w", "x")]);

    let expected = [
        ("x", vec!["x", "y", "z", "x"]),
        ("y", vec!["y", "z", "x", "y"]),
        ("z", vec!["z", "x", "y", "z"]),
        ("w", vec!["x", "y", "z", "x"]),
    ];
    for (root, cycle) in expected {
        let err = collect(&graph, &id(root)).unwrap_err();
        let cycle: Vec<ModuleId> = cycle.into_iter().map(id).collect();
        assert_eq!(err, CollectError::CyclicDependency { cycle }, "root {}", root);
    }
}

#[test]
fn test_collect_self_dependency() {
    let graph = chain(&[("a", "a")]);
    assert_eq!(
        collect(&graph, &id("a")),
        Err(CollectError::CyclicDependency {
            cycle: vec![id("a"), id("a")]
        })
    );
}

#[test]
fn test_collect_unknown_module() {
    let graph = chain(&[("app", "core")]);
    assert_eq!(
        collect(&graph, &id("app")),
        Err(CollectError::UnknownModule {
            module: id("core"),
            referenced_by: Some(id("app")),
        })
    );
    assert_eq!(
        collect(&graph, &id("nothing")),
        Err(CollectError::UnknownModule {
            module: id("nothing"),
            referenced_by: None,
        })
    );
}

#[test]
fn test_collect_is_snapshot() {
    let mut graph = chain(&[("core", ""), ("app", "core")]);
    let before = collect(&graph, &id("app")).unwrap();

    let mut late = ModuleDecl::new("late");
    late.declare_trait("Late", false);
    graph.add_module(late).unwrap();

    let after = collect(&graph, &id("app")).unwrap();
    assert_eq!(before, after);
    assert_eq!(before.traits().count(), 0);
}

#[test]
fn test_cycle_error_message() {
    let err = CollectError::CyclicDependency {
        cycle: vec![id("x"), id("y"), id("x")],
    };
    assert_eq!(err.to_string(), "cyclic dependency detected: x -> y -> x");
}
