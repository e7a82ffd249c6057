//! Keeps the registry in step with module lifecycle transitions.
use std::sync::Arc;
use tracing::{debug, warn};

use crate::container::{LifecycleListener, Module, ModuleContainer, ModuleState};
use crate::registry::TestRegistry;

/// What a lifecycle state means for the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Register,
    Remove,
    Ignore,
}

impl LifecycleAction {
    pub fn for_state(state: ModuleState) -> Self {
        match state {
            ModuleState::Installed | ModuleState::Active => LifecycleAction::Register,
            ModuleState::Stopping | ModuleState::Uninstalled => LifecycleAction::Remove,
            ModuleState::Resolved => LifecycleAction::Ignore,
        }
    }
}

pub struct ModuleLifecycleObserver {
    registry: Arc<TestRegistry>,
}

impl ModuleLifecycleObserver {
    pub fn new(registry: Arc<TestRegistry>) -> Arc<Self> {
        Arc::new(Self { registry })
    }

    pub fn registry(&self) -> &Arc<TestRegistry> {
        &self.registry
    }

    /// Subscribes to `container`, then registers every module already in a
    /// register-triggering state. Subscribing first means a module that
    /// appears during the bootstrap is seen at least once; duplicates are
    /// absorbed by the registry.
    pub fn activate(self: &Arc<Self>, container: &dyn ModuleContainer) {
        container.subscribe(self.clone());

        let modules = container.list_modules();
        debug!(modules = modules.len(), "bootstrapping registry from container");
        for module in modules {
            let state = module.state();
            self.handle(&*module, state);
        }
    }

    pub fn handle(&self, module: &dyn Module, state: ModuleState) -> LifecycleAction {
        let action = LifecycleAction::for_state(state);
        let outcome = match action {
            LifecycleAction::Register => self.registry.register_module(module),
            LifecycleAction::Remove => self.registry.remove_module(module.id()),
            LifecycleAction::Ignore => return action,
        };

        match outcome {
            Ok(count) => debug!(module = %module.id(), %state, ?action, count, "applied lifecycle change"),
            Err(e) => warn!(module = %module.id(), %state, error = %e, "lifecycle change not applied"),
        }
        action
    }
}

impl LifecycleListener for ModuleLifecycleObserver {
    fn module_changed(&self, module: &Arc<dyn Module>, state: ModuleState) {
        self.handle(&**module, state);
    }
}
