use super::common::*;
use modscout::container::{ModuleHost, ModuleSpec, ModuleState};
use modscout::discovery::StrategyKind;
use modscout::error::ListenerError;
use modscout::{ChangeEvent, ChangeKind, ModuleId};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::sync::Arc;

fn module(id: &str) -> ModuleSpec {
    ModuleSpec::new(id)
        .class("com.acme.OneTest", legacy_test("com.acme.OneTest"))
        .class("com.acme.TwoTest", legacy_test("com.acme.TwoTest"))
}

#[test]
fn test_event_accounting_through_lifecycle() {
    let host = Arc::new(ModuleHost::new());
    let registry = observed(&host, StrategyKind::Naming);

    let events = Arc::new(Mutex::new(Vec::<ChangeEvent>::new()));
    let sink = events.clone();
    registry.add_change_listener(Arc::new(move |event: &ChangeEvent| {
        sink.lock().push(event.clone());
        Ok::<(), ListenerError>(())
    }));

    let id = ModuleId::new("acme");
    host.install(module("acme")).unwrap();
    host.set_state(&id, ModuleState::Stopping).unwrap();

    let events = events.lock();
    let added: HashSet<String> = events
        .iter()
        .filter(|e| e.kind() == ChangeKind::Add)
        .map(|e| e.unit().id())
        .collect();
    let removed: HashSet<String> = events
        .iter()
        .filter(|e| e.kind() == ChangeKind::Remove)
        .map(|e| e.unit().id())
        .collect();

    assert_eq!(events.len(), 4);
    assert_eq!(added.len(), 2);
    assert_eq!(added, removed);
}

#[test]
fn test_scoped_removal_on_uninstall() {
    let host = Arc::new(ModuleHost::new());
    let registry = observed(&host, StrategyKind::Naming);

    host.install(module("a")).unwrap();
    host.install(module("b")).unwrap();
    assert_eq!(registry.all_units().len(), 4);

    host.uninstall(&ModuleId::new("a")).unwrap();

    assert_eq!(
        ids(&registry.all_units()),
        vec!["b@com.acme.OneTest", "b@com.acme.TwoTest"]
    );
}

#[test]
fn test_late_observer_bootstraps_installed_modules() {
    let host = Arc::new(ModuleHost::new());
    host.install(module("early")).unwrap();
    host.install_with_state(module("resolved"), ModuleState::Resolved).unwrap();

    let registry = observed(&host, StrategyKind::Naming);

    assert_eq!(registry.module_count(), 1);
    assert!(registry.is_registered(&ModuleId::new("early")));

    host.set_state(&ModuleId::new("resolved"), ModuleState::Active).unwrap();
    assert_eq!(registry.module_count(), 2);
}
