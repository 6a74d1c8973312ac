//! End-to-end scenarios through the public library API

use yaoxiang_coherence::check_graph;
use yaoxiang_coherence::module::{load_graph_from_str, CollectError, GraphFormat, ModuleId};
use yaoxiang_coherence::traits::{Record, Rejection};
use yaoxiang_coherence::util::config::CoherenceConfig;

const WORKSPACE: &str = r#"{
  "modules": [
    {
      "id": "core",
      "traits": [{ "name": "Show" }],
      "types": [{ "name": "Id" }, { "name": "Box", "arity": 1, "fundamental": true }],
      "impls": [{ "id": "show_id", "trait": "Show", "for": "Id" }]
    },
    { "id": "ext", "deps": ["core"], "types": [{ "name": "Widget" }] },
    {
      "id": "p1",
      "deps": ["ext"],
      "types": [{ "name": "Wrap", "arity": 1 }],
      "impls": [{ "id": "p1_wrap", "trait": "Show", "for": "Wrap<Widget>" }]
    },
    {
      "id": "p2",
      "deps": ["ext"],
      "types": [{ "name": "Wrap", "arity": 1 }],
      "impls": [{ "id": "p2_wrap", "trait": "Show", "for": "Wrap<Widget>" }]
    },
    { "id": "combo", "deps": ["p1", "p2"] },
    {
      "id": "app",
      "deps": ["ext"],
      "types": [{ "name": "AppType" }],
      "impls": [
        { "id": "show_widget", "trait": "Show", "for": "Widget" },
        { "id": "show_core_id", "trait": "Show", "for": "core.Id" },
        { "id": "show_app", "trait": "Show", "for": "AppType" },
        { "id": "show_boxed", "trait": "Show", "for": "core.Box<AppType>" }
      ]
    }
  ]
}"#;

fn ids(names: &[&str]) -> Vec<ModuleId> {
    names.iter().map(|name| ModuleId::new(*name)).collect()
}

#[test]
fn test_workspace_reports() {
    let graph = load_graph_from_str(WORKSPACE, GraphFormat::Json).unwrap();
    let reports = check_graph(&graph, &[], &CoherenceConfig::default()).unwrap();

    // 全部模块，依赖在前
    assert_eq!(reports.len(), 6);
    assert_eq!(reports[0].module, ModuleId::new("core"));

    let by_module = |name: &str| {
        reports
            .iter()
            .find(|r| r.module.as_str() == name)
            .unwrap()
    };

    assert!(!by_module("core").has_errors(true));
    assert!(!by_module("p1").has_errors(true));
    assert!(!by_module("p2").has_errors(true));
    assert!(!by_module("combo").has_errors(true));

    let app = by_module("app");
    let summary = app.summary();
    assert_eq!((summary.accepted, summary.orphan), (2, 2));
    assert!(app.has_errors(false));
}

#[test]
fn test_selected_modules_in_given_order() {
    let graph = load_graph_from_str(WORKSPACE, GraphFormat::Json).unwrap();
    let reports = check_graph(&graph, &ids(&["combo", "app"]), &CoherenceConfig::default()).unwrap();

    let modules: Vec<_> = reports.iter().map(|r| r.module.as_str()).collect();
    assert_eq!(modules, vec!["combo", "app"]);
}

#[test]
fn test_configured_fundamental() {
    let source = r#"
        (modules: [
            (id: "core", traits: [(name: "Show")], types: [(name: "Ref", arity: 1)]),
            (
                id: "app",
                deps: ["core"],
                types: [(name: "Local")],
                impls: [(id: "show_ref", trait: "Show", for: "core.Ref<Local>")],
            ),
        ])
    "#;
    let graph = load_graph_from_str(source, GraphFormat::Ron).unwrap();
    let app = ids(&["app"]);

    let reports = check_graph(&graph, &app, &CoherenceConfig::default()).unwrap();
    assert!(matches!(
        reports[0].rejections().next(),
        Some((_, Rejection::OrphanViolation(_)))
    ));

    let mut config = CoherenceConfig::default();
    config.check.fundamental = vec!["core.Ref".to_string()];
    let reports = check_graph(&graph, &app, &config).unwrap();
    assert!(reports[0].records.iter().all(Record::is_accepted));
}

#[test]
fn test_invalid_configured_fundamental() {
    let graph = load_graph_from_str(WORKSPACE, GraphFormat::Json).unwrap();
    let mut config = CoherenceConfig::default();
    config.check.fundamental = vec!["Box".to_string()];

    let error = check_graph(&graph, &[], &config).unwrap_err();
    assert!(error.to_string().contains("Box"));
}

#[test]
fn test_cycle_reported_per_module() {
    let source = r#"{
      "modules": [
        { "id": "a", "deps": ["b"] },
        { "id": "b", "deps": ["a"] },
        { "id": "c" }
      ]
    }"#;
    let graph = load_graph_from_str(source, GraphFormat::Json).unwrap();
    let reports = check_graph(&graph, &[], &CoherenceConfig::default()).unwrap();

    // 有环时退回声明顺序
    let modules: Vec<_> = reports.iter().map(|r| r.module.as_str()).collect();
    assert_eq!(modules, vec!["a", "b", "c"]);

    assert_eq!(
        reports[0].fatal_error(),
        Some(&CollectError::CyclicDependency {
            cycle: ids(&["a", "b", "a"]),
        })
    );
    assert_eq!(
        reports[1].fatal_error(),
        Some(&CollectError::CyclicDependency {
            cycle: ids(&["b", "a", "b"]),
        })
    );
    assert!(!reports[2].is_fatal());
}

#[test]
fn test_parallel_matches_sequential() {
    let graph = load_graph_from_str(WORKSPACE, GraphFormat::Json).unwrap();
    let mut config = CoherenceConfig::default();
    let parallel = check_graph(&graph, &[], &config).unwrap();
    config.check.parallel = false;
    let sequential = check_graph(&graph, &[], &config).unwrap();
    assert_eq!(parallel, sequential);
}
