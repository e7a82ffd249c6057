use super::common::*;
use modscout::config::LEGACY_TEST_BASE;
use modscout::container::{ModuleHost, ModuleSpec, ModuleState};
use modscout::discovery::StrategyKind;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn base_module() -> ModuleSpec {
    ModuleSpec::new("y").class("com.y.BaseCase", subclass("com.y.BaseCase", LEGACY_TEST_BASE))
}

#[test]
fn test_lineage_across_dependency_boundary() {
    let host = Arc::new(ModuleHost::new());
    let registry = observed(&host, StrategyKind::Naming);

    host.install_with_state(base_module(), ModuleState::Resolved).unwrap();
    host.install(
        ModuleSpec::new("x")
            .import("com.y", &["y"])
            .class("com.x.FooTestCase", subclass("com.x.FooTestCase", "com.y.BaseCase")),
    )
    .unwrap();

    assert_eq!(ids(&registry.all_units()), vec!["x@com.x.FooTestCase"]);
}

#[test]
fn test_lineage_across_dependency_boundary_reflectively() {
    let host = Arc::new(ModuleHost::new());
    let registry = observed(&host, StrategyKind::Naming);

    host.install_with_state(junit_module(), ModuleState::Resolved).unwrap();
    host.install_with_state(base_module().import(JUNIT_PACKAGE, &["junit"]), ModuleState::Resolved)
        .unwrap();
    host.install_with_state(
        ModuleSpec::new("x")
            .import("com.y", &["y"])
            .class("com.x.FooTestCase", subclass("com.x.FooTestCase", "com.y.BaseCase")),
        ModuleState::Active,
    )
    .unwrap();

    assert_eq!(ids(&registry.all_units()), vec!["x@com.x.FooTestCase"]);
}

#[test]
fn test_undeclared_dependency_is_a_negative_result() {
    let host = Arc::new(ModuleHost::new());
    let registry = observed(&host, StrategyKind::Naming);

    host.install_with_state(base_module(), ModuleState::Resolved).unwrap();
    host.install(
        ModuleSpec::new("x")
            .class("com.x.FooTestCase", subclass("com.x.FooTestCase", "com.y.BaseCase")),
    )
    .unwrap();

    assert!(registry.all_units().is_empty());
}

#[test]
fn test_cyclic_declarations_do_not_hang_discovery() {
    let host = Arc::new(ModuleHost::new());
    let registry = observed(&host, StrategyKind::Naming);

    host.install(
        ModuleSpec::new("a")
            .import("com.b", &["b"])
            .class("com.a.LoopTest", subclass("com.a.LoopTest", "com.b.Middle")),
    )
    .unwrap();
    host.install(
        ModuleSpec::new("b")
            .import("com.a", &["a"])
            .class("com.b.Middle", subclass("com.b.Middle", "com.a.LoopTest")),
    )
    .unwrap();

    assert!(registry.all_units().is_empty());
    assert_eq!(registry.module_count(), 2);
}
