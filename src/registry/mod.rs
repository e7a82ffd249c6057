//! The live index of discovered test units.
//!
//! [`RegistryStore`] owns the per-module unit sets and fans change events
//! out to listeners. [`TestRegistry`] pairs it with a discovery strategy so
//! callers can hand it a module and get its tests indexed.
mod listener;
mod store;

pub use listener::ChangeListener;
pub use store::RegistryStore;

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, trace};

use crate::container::{Module, ModuleContainer};
use crate::discovery::DiscoveryStrategy;
use crate::error::RegistryError;
use crate::model::{ModuleId, TestUnit};

pub struct TestRegistry {
    store: RegistryStore,
    strategy: Box<dyn DiscoveryStrategy>,
    container: Arc<dyn ModuleContainer>,
}

impl TestRegistry {
    pub fn new(strategy: Box<dyn DiscoveryStrategy>, container: Arc<dyn ModuleContainer>) -> Self {
        Self {
            store: RegistryStore::new(),
            strategy,
            container,
        }
    }

    pub fn store(&self) -> &RegistryStore {
        &self.store
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Discovers and indexes the module's tests. A module that is already
    /// registered is left untouched and no discovery runs.
    pub fn register_module(&self, module: &dyn Module) -> Result<usize, RegistryError> {
        let id = module.id();
        if id.is_empty() {
            return Err(RegistryError::invalid_argument("module identity must not be empty"));
        }
        if self.store.contains(id) {
            trace!(module = %id, "already registered, skipping discovery");
            return Ok(0);
        }

        let units = self.strategy.discover(module, &*self.container);
        let added = self.store.register_module(id, units)?;
        if added > 0 {
            info!(module = %id, strategy = self.strategy.name(), added, "indexed test units");
        }
        Ok(added)
    }

    pub fn remove_module(&self, id: &ModuleId) -> Result<usize, RegistryError> {
        self.store.remove_module(id)
    }

    /// Drops whatever is indexed for the module and discovers it again.
    pub fn rescan(&self, module: &dyn Module) -> Result<usize, RegistryError> {
        self.store.remove_module(module.id())?;
        self.register_module(module)
    }

    pub fn all_units(&self) -> Vec<TestUnit> {
        self.store.snapshot()
    }

    pub fn units(&self, ids: &HashSet<String>) -> Vec<TestUnit> {
        self.store.snapshot_ids(ids)
    }

    pub fn add_change_listener(&self, listener: Arc<dyn ChangeListener>) -> bool {
        self.store.add_listener(listener)
    }

    pub fn remove_change_listener(&self, listener: &Arc<dyn ChangeListener>) -> bool {
        self.store.remove_listener(listener)
    }

    pub fn is_registered(&self, id: &ModuleId) -> bool {
        self.store.contains(id)
    }

    pub fn module_count(&self) -> usize {
        self.store.module_count()
    }
}
