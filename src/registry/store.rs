use arc_swap::ArcSwap;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, trace};

use super::ChangeListener;
use crate::error::RegistryError;
use crate::model::{ChangeEvent, ModuleId, TestUnit};

type Listeners = Vec<Arc<dyn ChangeListener>>;

/// Concurrent per-module index of accepted test units.
///
/// Each module's unit set is installed and removed as one `Arc`, so readers
/// never observe a half-updated module. Events are dispatched after the map
/// shard is unlocked, which lets listeners read the store.
pub struct RegistryStore {
    modules: DashMap<ModuleId, Arc<HashSet<TestUnit>>>,
    listeners: ArcSwap<Listeners>,
    listener_writes: Mutex<()>,
}

impl RegistryStore {
    pub fn new() -> Self {
        Self {
            modules: DashMap::new(),
            listeners: ArcSwap::from_pointee(Vec::new()),
            listener_writes: Mutex::new(()),
        }
    }

    /// Installs `units` under `module` unless the module is already present.
    ///
    /// Returns the number of units inserted (0 for an already registered
    /// module); one ADD event fires per inserted unit.
    pub fn register_module(
        &self,
        module: &ModuleId,
        units: HashSet<TestUnit>,
    ) -> Result<usize, RegistryError> {
        if module.is_empty() {
            return Err(RegistryError::invalid_argument("module identity must not be empty"));
        }
        if let Some(stray) = units.iter().find(|u| u.module() != module) {
            return Err(RegistryError::invalid_argument(format!(
                "unit {} does not belong to module {module}",
                stray.id()
            )));
        }

        let inserted = match self.modules.entry(module.clone()) {
            Entry::Occupied(_) => {
                trace!(%module, "module already registered");
                return Ok(0);
            }
            Entry::Vacant(slot) => {
                let units = Arc::new(units);
                slot.insert(units.clone());
                units
            }
        };

        debug!(%module, units = inserted.len(), "registered module");
        self.dispatch(inserted.iter().map(|u| ChangeEvent::added(u.clone())));
        Ok(inserted.len())
    }

    /// Removes every unit of `module`, firing one REMOVE event per unit.
    pub fn remove_module(&self, module: &ModuleId) -> Result<usize, RegistryError> {
        if module.is_empty() {
            return Err(RegistryError::invalid_argument("module identity must not be empty"));
        }

        let Some((_, removed)) = self.modules.remove(module) else {
            trace!(%module, "module not registered, nothing to remove");
            return Ok(0);
        };

        debug!(%module, units = removed.len(), "removed module");
        self.dispatch(removed.iter().map(|u| ChangeEvent::removed(u.clone())));
        Ok(removed.len())
    }

    pub fn contains(&self, module: &ModuleId) -> bool {
        self.modules.contains_key(module)
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn units_of(&self, module: &ModuleId) -> Option<Arc<HashSet<TestUnit>>> {
        self.modules.get(module).map(|entry| entry.value().clone())
    }

    /// All registered units, ordered by external id.
    pub fn snapshot(&self) -> Vec<TestUnit> {
        let sets: Vec<Arc<HashSet<TestUnit>>> =
            self.modules.iter().map(|entry| entry.value().clone()).collect();
        let mut units: Vec<TestUnit> = sets.iter().flat_map(|s| s.iter().cloned()).collect();
        units.sort();
        units
    }

    /// Registered units whose external id is in `ids`; unknown ids are ignored.
    pub fn snapshot_ids(&self, ids: &HashSet<String>) -> Vec<TestUnit> {
        self.snapshot()
            .into_iter()
            .filter(|u| ids.contains(&u.id()))
            .collect()
    }

    /// Adds a listener; false if this exact listener is already registered.
    pub fn add_listener(&self, listener: Arc<dyn ChangeListener>) -> bool {
        let _writes = self.listener_writes.lock();
        let current = self.listeners.load_full();
        if current.iter().any(|l| same_listener(l, &listener)) {
            return false;
        }
        let mut next = (*current).clone();
        next.push(listener);
        self.listeners.store(Arc::new(next));
        true
    }

    pub fn remove_listener(&self, listener: &Arc<dyn ChangeListener>) -> bool {
        let _writes = self.listener_writes.lock();
        let current = self.listeners.load_full();
        let next: Listeners = current
            .iter()
            .filter(|l| !same_listener(l, listener))
            .cloned()
            .collect();
        if next.len() == current.len() {
            return false;
        }
        self.listeners.store(Arc::new(next));
        true
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.load().len()
    }

    fn dispatch(&self, events: impl Iterator<Item = ChangeEvent>) {
        let listeners = self.listeners.load_full();
        if listeners.is_empty() {
            return;
        }
        for event in events {
            for listener in listeners.iter() {
                deliver(listener, &event);
            }
        }
    }
}

impl Default for RegistryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn same_listener(a: &Arc<dyn ChangeListener>, b: &Arc<dyn ChangeListener>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

fn deliver(listener: &Arc<dyn ChangeListener>, event: &ChangeEvent) {
    let outcome = catch_unwind(AssertUnwindSafe(|| listener.on_change(event)));
    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(
            listener = listener.name(),
            address = ?Arc::as_ptr(listener),
            kind = event.kind().as_str(),
            unit = %event.unit(),
            error = %e,
            "change listener failed"
        ),
        Err(panic) => error!(
            listener = listener.name(),
            address = ?Arc::as_ptr(listener),
            kind = event.kind().as_str(),
            unit = %event.unit(),
            panic = panic_message(&*panic),
            "change listener panicked"
        ),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
