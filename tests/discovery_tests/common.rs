use modscout::classfile::ClassFileBuilder;
use modscout::config::{DiscoveryConfig, LEGACY_TEST_BASE};
use modscout::container::{ModuleHost, ModuleSpec};
use modscout::discovery::{create_strategy, StrategyKind};
use modscout::{ModuleLifecycleObserver, TestRegistry, TestUnit};
use std::sync::Arc;

/// Public concrete type extending `super_name` with a public no-arg constructor.
pub fn subclass(name: &str, super_name: &str) -> Vec<u8> {
    ClassFileBuilder::new(name)
        .superclass(super_name)
        .public_constructor()
        .build()
}

pub fn legacy_test(name: &str) -> Vec<u8> {
    subclass(name, LEGACY_TEST_BASE)
}

/// Plain type carrying one annotated test method.
pub fn annotated_test(name: &str) -> Vec<u8> {
    ClassFileBuilder::new(name)
        .public_constructor()
        .annotated_method("works", "org.junit.Test")
        .build()
}

pub fn plain(name: &str) -> Vec<u8> {
    ClassFileBuilder::new(name).public_constructor().build()
}

pub fn registry(host: &Arc<ModuleHost>, strategy: StrategyKind) -> Arc<TestRegistry> {
    let config = DiscoveryConfig {
        strategy,
        ..DiscoveryConfig::default()
    };
    Arc::new(TestRegistry::new(create_strategy(&config), host.clone()))
}

/// Registry wired to `host` through an activated lifecycle observer.
pub fn observed(host: &Arc<ModuleHost>, strategy: StrategyKind) -> Arc<TestRegistry> {
    let registry = registry(host, strategy);
    ModuleLifecycleObserver::new(registry.clone()).activate(&**host);
    registry
}

pub fn ids(units: &[TestUnit]) -> Vec<String> {
    units.iter().map(TestUnit::id).collect()
}

/// Supplier of the legacy test base for modules classified reflectively.
/// Install it RESOLVED so the observer leaves it alone.
pub fn junit_module() -> ModuleSpec {
    ModuleSpec::new("junit").class(
        LEGACY_TEST_BASE,
        ClassFileBuilder::new(LEGACY_TEST_BASE)
            .abstract_type()
            .public_constructor()
            .build(),
    )
}

pub const JUNIT_PACKAGE: &str = "junit.framework";
