use super::common::*;
use modscout::config::DECLARED_TESTS_KEY;
use modscout::container::{ModuleHost, ModuleSpec};
use modscout::discovery::StrategyKind;
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[test]
fn test_declared_list_ignores_naming() {
    let host = Arc::new(ModuleHost::new());
    let registry = observed(&host, StrategyKind::Declared);

    host.install(
        ModuleSpec::new("acme")
            .metadata(DECLARED_TESTS_KEY, "com.acme.Checks, com.acme.Missing, com.acme.Plain")
            .class("com.acme.Checks", annotated_test("com.acme.Checks"))
            .class("com.acme.Plain", plain("com.acme.Plain"))
            .class("com.acme.UndeclaredTest", annotated_test("com.acme.UndeclaredTest")),
    )
    .unwrap();

    assert_eq!(ids(&registry.all_units()), vec!["acme@com.acme.Checks"]);
}

#[test]
fn test_module_without_metadata_contributes_nothing() {
    let host = Arc::new(ModuleHost::new());
    let registry = observed(&host, StrategyKind::Declared);

    host.install(ModuleSpec::new("acme").class("com.acme.FooTest", annotated_test("com.acme.FooTest")))
        .unwrap();

    assert!(registry.all_units().is_empty());
    assert!(registry.is_registered(&"acme".into()));
}
