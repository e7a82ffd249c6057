use super::common::*;
use modscout::classfile::ClassFileBuilder;
use modscout::config::LEGACY_TEST_BASE;
use modscout::container::{ModuleHost, ModuleSpec, ModuleState};
use modscout::discovery::StrategyKind;
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[test]
fn test_acme_scenario() {
    let host = Arc::new(ModuleHost::new());
    let registry = observed(&host, StrategyKind::Naming);

    host.install_with_state(junit_module(), ModuleState::Resolved).unwrap();
    host.install_with_state(
        ModuleSpec::new("acme")
            .import(JUNIT_PACKAGE, &["junit"])
            .class("SimpleTestCase", legacy_test("SimpleTestCase"))
            .class("JUnit3Test", legacy_test("JUnit3Test"))
            .class("GenericClass", legacy_test("GenericClass"))
            .class("ServiceIT", annotated_test("ServiceIT"))
            .class("SimpleITTest", annotated_test("SimpleITTest")),
        ModuleState::Active,
    )
    .unwrap();

    assert_eq!(
        ids(&registry.all_units()),
        vec![
            "acme@JUnit3Test",
            "acme@ServiceIT",
            "acme@SimpleITTest",
            "acme@SimpleTestCase",
        ]
    );
}

#[test]
fn test_same_scenario_in_binary_mode() {
    let host = Arc::new(ModuleHost::new());
    let registry = observed(&host, StrategyKind::Naming);

    let module = host
        .install(
            ModuleSpec::new("acme")
                .lazy()
                .class("com.acme.SimpleTestCase", legacy_test("com.acme.SimpleTestCase"))
                .class("com.acme.GenericClass", legacy_test("com.acme.GenericClass"))
                .class("com.acme.ServiceIT", annotated_test("com.acme.ServiceIT")),
        )
        .unwrap();

    assert_eq!(
        ids(&registry.all_units()),
        vec!["acme@com.acme.ServiceIT", "acme@com.acme.SimpleTestCase"]
    );
    assert_eq!(module.load_count(), 0);
}

#[test]
fn test_helper_with_test_lineage_is_hidden_by_naming_gate() {
    let host = Arc::new(ModuleHost::new());
    let registry = observed(&host, StrategyKind::Naming);

    host.install(ModuleSpec::new("acme").class("com.acme.Helper", legacy_test("com.acme.Helper")))
        .unwrap();

    assert!(registry.all_units().is_empty());
    assert_eq!(registry.module_count(), 1);
}

#[test]
fn test_abstract_test_is_never_discovered() {
    let host = Arc::new(ModuleHost::new());
    let registry = observed(&host, StrategyKind::Naming);

    host.install_with_state(
        ModuleSpec::new("acme")
            .class(
                "com.acme.AbstractFooTest",
                ClassFileBuilder::new("com.acme.AbstractFooTest")
                    .superclass(LEGACY_TEST_BASE)
                    .abstract_type()
                    .public_constructor()
                    .build(),
            )
            .class(
                "com.acme.FooTest",
                subclass("com.acme.FooTest", "com.acme.AbstractFooTest"),
            ),
        ModuleState::Installed,
    )
    .unwrap();

    assert_eq!(ids(&registry.all_units()), vec!["acme@com.acme.FooTest"]);
}

#[test]
fn test_nested_and_non_tests_are_skipped() {
    let host = Arc::new(ModuleHost::new());
    let registry = observed(&host, StrategyKind::Naming);

    host.install(
        ModuleSpec::new("acme")
            .class("com.acme.FooTest", annotated_test("com.acme.FooTest"))
            .class("com.acme.FooTest$Inner", annotated_test("com.acme.FooTest$Inner"))
            .class("com.acme.PlainTest", plain("com.acme.PlainTest"))
            .class(
                "com.acme.HiddenTest",
                ClassFileBuilder::new("com.acme.HiddenTest")
                    .package_private()
                    .public_constructor()
                    .annotated_method("works", "org.junit.Test")
                    .build(),
            ),
    )
    .unwrap();

    assert_eq!(ids(&registry.all_units()), vec!["acme@com.acme.FooTest"]);
}
