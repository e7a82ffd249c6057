use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

use super::{
    ActivationPolicy, LifecycleListener, LoadedType, Module, ModuleContainer, ModuleState,
};
use crate::classfile::{self, ClassDescriptor};
use crate::config::DEFAULT_PLATFORM_PREFIXES;
use crate::error::ContainerError;
use crate::model::ModuleId;

const MAX_CHAIN_LENGTH: usize = 256;

/// Everything needed to install one module into a [`ModuleHost`].
#[derive(Debug, Clone)]
pub struct ModuleSpec {
    pub id: ModuleId,
    pub activation: ActivationPolicy,
    pub entries: BTreeMap<String, Vec<u8>>,
    pub metadata: HashMap<String, String>,
    pub imports: HashMap<String, Vec<ModuleId>>,
}

impl ModuleSpec {
    pub fn new(id: impl Into<ModuleId>) -> Self {
        Self {
            id: id.into(),
            activation: ActivationPolicy::Eager,
            entries: BTreeMap::new(),
            metadata: HashMap::new(),
            imports: HashMap::new(),
        }
    }

    pub fn lazy(mut self) -> Self {
        self.activation = ActivationPolicy::Lazy;
        self
    }

    pub fn entry(mut self, path: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.entries.insert(path.into(), bytes);
        self
    }

    /// Adds a compiled descriptor under the entry path derived from `type_name`.
    pub fn class(self, type_name: &str, bytes: Vec<u8>) -> Self {
        self.entry(classfile::entry_path(type_name), bytes)
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn import(mut self, package: impl Into<String>, providers: &[&str]) -> Self {
        self.imports.insert(
            package.into(),
            providers.iter().map(|p| ModuleId::new(p)).collect(),
        );
        self
    }
}

struct HostInner {
    modules: RwLock<BTreeMap<ModuleId, Arc<HostedModule>>>,
    listeners: RwLock<Vec<Arc<dyn LifecycleListener>>>,
    platform_prefixes: Vec<String>,
}

impl HostInner {
    fn is_platform(&self, type_name: &str) -> bool {
        self.platform_prefixes
            .iter()
            .any(|p| type_name.starts_with(p.as_str()))
    }
}

/// In-process module container.
///
/// Lifecycle notifications are delivered synchronously on the thread that
/// performs the transition, after all host locks are released.
#[derive(Clone)]
pub struct ModuleHost {
    inner: Arc<HostInner>,
}

impl ModuleHost {
    pub fn new() -> Self {
        Self::with_platform_prefixes(DEFAULT_PLATFORM_PREFIXES.iter().map(|p| p.to_string()))
    }

    pub fn with_platform_prefixes(prefixes: impl IntoIterator<Item = String>) -> Self {
        Self {
            inner: Arc::new(HostInner {
                modules: RwLock::new(BTreeMap::new()),
                listeners: RwLock::new(Vec::new()),
                platform_prefixes: prefixes.into_iter().collect(),
            }),
        }
    }

    pub fn install(&self, spec: ModuleSpec) -> Result<Arc<HostedModule>, ContainerError> {
        self.install_with_state(spec, ModuleState::Installed)
    }

    /// Installs a module directly into `state`, notifying once.
    pub fn install_with_state(
        &self,
        spec: ModuleSpec,
        state: ModuleState,
    ) -> Result<Arc<HostedModule>, ContainerError> {
        let module = Arc::new(HostedModule {
            id: spec.id.clone(),
            activation: spec.activation,
            entries: spec.entries,
            metadata: spec.metadata,
            imports: spec.imports,
            state: RwLock::new(state),
            host: Arc::downgrade(&self.inner),
            loads: AtomicUsize::new(0),
            activations: AtomicUsize::new(0),
        });

        {
            let mut modules = self.inner.modules.write();
            if modules.contains_key(&spec.id) {
                return Err(ContainerError::module_already_installed(spec.id.as_str()));
            }
            modules.insert(spec.id.clone(), module.clone());
        }

        debug!(module = %spec.id, entries = module.entries.len(), %state, "installed module");
        self.notify(module.clone(), state);
        Ok(module)
    }

    pub fn set_state(&self, id: &ModuleId, state: ModuleState) -> Result<(), ContainerError> {
        let module = self
            .get(id)
            .ok_or_else(|| ContainerError::module_not_found(id.as_str()))?;
        *module.state.write() = state;
        trace!(module = %id, %state, "module state changed");
        self.notify(module, state);
        Ok(())
    }

    /// Moves the module to UNINSTALLED, notifies, then forgets it.
    pub fn uninstall(&self, id: &ModuleId) -> Result<(), ContainerError> {
        self.set_state(id, ModuleState::Uninstalled)?;
        self.inner.modules.write().remove(id);
        Ok(())
    }

    pub fn get(&self, id: &ModuleId) -> Option<Arc<HostedModule>> {
        self.inner.modules.read().get(id).cloned()
    }

    fn notify(&self, module: Arc<HostedModule>, state: ModuleState) {
        let listeners = self.inner.listeners.read().clone();
        let module: Arc<dyn Module> = module;
        for listener in listeners {
            listener.module_changed(&module, state);
        }
    }
}

impl Default for ModuleHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleContainer for ModuleHost {
    fn list_modules(&self) -> Vec<Arc<dyn Module>> {
        self.inner
            .modules
            .read()
            .values()
            .map(|m| m.clone() as Arc<dyn Module>)
            .collect()
    }

    fn module(&self, id: &ModuleId) -> Option<Arc<dyn Module>> {
        self.get(id).map(|m| m as Arc<dyn Module>)
    }

    fn subscribe(&self, listener: Arc<dyn LifecycleListener>) {
        self.inner.listeners.write().push(listener);
    }
}

pub struct HostedModule {
    id: ModuleId,
    activation: ActivationPolicy,
    entries: BTreeMap<String, Vec<u8>>,
    metadata: HashMap<String, String>,
    imports: HashMap<String, Vec<ModuleId>>,
    state: RwLock<ModuleState>,
    host: Weak<HostInner>,
    loads: AtomicUsize,
    activations: AtomicUsize,
}

impl HostedModule {
    /// Number of `load_type` calls served by this module.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Number of times a type load activated this module.
    pub fn activations(&self) -> usize {
        self.activations.load(Ordering::SeqCst)
    }

    /// Finds the descriptor for `name` visible to this module, returning the
    /// supplying peer when it is not one of our own entries.
    fn locate(
        &self,
        host: &HostInner,
        name: &str,
    ) -> Option<(Vec<u8>, Option<Arc<HostedModule>>)> {
        let path = classfile::entry_path(name);
        if let Some(bytes) = self.entries.get(&path) {
            return Some((bytes.clone(), None));
        }

        let providers = self.imports.get(classfile::package_of(name))?;
        let modules = host.modules.read();
        providers.iter().find_map(|pid| {
            let peer = modules.get(pid)?;
            let bytes = peer.entries.get(&path)?;
            Some((bytes.clone(), Some(peer.clone())))
        })
    }

    fn define(&self, name: &str, bytes: &[u8]) -> Result<ClassDescriptor, ContainerError> {
        classfile::parse(bytes).map_err(|e| ContainerError::malformed_type(name, e))
    }

    fn activate_lazily(&self) {
        let mut state = self.state.write();
        if *state == ModuleState::Resolved && self.activation == ActivationPolicy::Lazy {
            *state = ModuleState::Active;
            self.activations.fetch_add(1, Ordering::SeqCst);
            debug!(module = %self.id, "type load activated lazy module");
        }
    }
}

impl Module for HostedModule {
    fn id(&self) -> &ModuleId {
        &self.id
    }

    fn state(&self) -> ModuleState {
        *self.state.read()
    }

    fn activation_policy(&self) -> ActivationPolicy {
        self.activation
    }

    fn list_entries(&self, suffix: Option<&str>) -> Vec<String> {
        self.entries
            .keys()
            .filter(|path| suffix.map_or(true, |s| path.ends_with(s)))
            .cloned()
            .collect()
    }

    fn entry(&self, path: &str) -> Result<Option<Vec<u8>>, ContainerError> {
        Ok(self.entries.get(path).cloned())
    }

    fn load_type(&self, name: &str) -> Result<LoadedType, ContainerError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let host = self
            .host
            .upgrade()
            .ok_or_else(|| ContainerError::module_not_found(self.id.as_str()))?;

        let (bytes, owner) = self
            .locate(&host, name)
            .ok_or_else(|| ContainerError::type_not_found(self.id.as_str(), name))?;
        let desc = self.define(name, &bytes)?;

        let mut ancestors = Vec::new();
        let mut seen = HashSet::new();
        let mut owner = owner;
        let mut next = desc.super_name.clone();

        while let Some(super_name) = next {
            ancestors.push(super_name.clone());
            if host.is_platform(&super_name) {
                break;
            }
            if !seen.insert(super_name.clone()) || ancestors.len() > MAX_CHAIN_LENGTH {
                return Err(ContainerError::unresolved_type(
                    self.id.as_str(),
                    name,
                    super_name,
                ));
            }

            let resolver: &HostedModule = owner.as_deref().unwrap_or(self);
            let (bytes, found_in) = resolver.locate(&host, &super_name).ok_or_else(|| {
                ContainerError::unresolved_type(self.id.as_str(), name, super_name.clone())
            })?;
            let super_desc = resolver.define(&super_name, &bytes)?;

            if found_in.is_some() {
                owner = found_in;
            }
            next = super_desc.super_name;
        }

        self.activate_lazily();

        Ok(LoadedType {
            name: desc.name,
            access: desc.access,
            ancestors,
            constructors: desc.constructors,
            type_annotations: desc.type_annotations,
            method_annotations: desc.method_annotations,
        })
    }

    fn metadata(&self, key: &str) -> Option<String> {
        self.metadata.get(key).cloned()
    }

    fn dependency_providers(&self, package: &str) -> Vec<ModuleId> {
        self.imports.get(package).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::ClassFileBuilder;
    use parking_lot::Mutex;

    fn base_module() -> ModuleSpec {
        ModuleSpec::new("junit").class(
            "junit.framework.TestCase",
            ClassFileBuilder::new("junit.framework.TestCase")
                .abstract_type()
                .public_constructor()
                .build(),
        )
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(String, ModuleState)>>,
    }

    impl LifecycleListener for Recorder {
        fn module_changed(&self, module: &Arc<dyn Module>, state: ModuleState) {
            self.seen.lock().push((module.id().to_string(), state));
        }
    }

    #[test]
    fn test_lifecycle_notifications_in_order() {
        let host = ModuleHost::new();
        let recorder = Arc::new(Recorder::default());
        host.subscribe(recorder.clone());

        host.install(ModuleSpec::new("acme")).unwrap();
        host.set_state(&ModuleId::new("acme"), ModuleState::Active)
            .unwrap();
        host.uninstall(&ModuleId::new("acme")).unwrap();

        let seen = recorder.seen.lock().clone();
        assert_eq!(
            seen,
            vec![
                ("acme".to_string(), ModuleState::Installed),
                ("acme".to_string(), ModuleState::Active),
                ("acme".to_string(), ModuleState::Uninstalled),
            ]
        );
        assert!(host.list_modules().is_empty());
    }

    #[test]
    fn test_duplicate_install_is_rejected() {
        let host = ModuleHost::new();
        host.install(ModuleSpec::new("acme")).unwrap();
        assert!(host.install(ModuleSpec::new("acme")).is_err());
    }

    #[test]
    fn test_load_type_walks_chain_across_imports() {
        let host = ModuleHost::new();
        host.install(base_module()).unwrap();
        let acme = host
            .install(
                ModuleSpec::new("acme")
                    .import("junit.framework", &["junit"])
                    .class(
                        "com.acme.FooTest",
                        ClassFileBuilder::new("com.acme.FooTest")
                            .superclass("junit.framework.TestCase")
                            .public_constructor()
                            .build(),
                    ),
            )
            .unwrap();

        let ty = acme.load_type("com.acme.FooTest").unwrap();
        assert_eq!(
            ty.ancestors,
            vec!["junit.framework.TestCase".to_string(), "java.lang.Object".to_string()]
        );
        assert_eq!(acme.load_count(), 1);
    }

    #[test]
    fn test_load_type_fails_on_missing_link() {
        let host = ModuleHost::new();
        let acme = host
            .install(ModuleSpec::new("acme").class(
                "com.acme.FooTest",
                ClassFileBuilder::new("com.acme.FooTest")
                    .superclass("com.missing.Base")
                    .build(),
            ))
            .unwrap();

        let err = acme.load_type("com.acme.FooTest").unwrap_err();
        assert!(matches!(err, ContainerError::UnresolvedType { .. }));
    }

    #[test]
    fn test_load_type_activates_resolved_lazy_module() {
        let host = ModuleHost::new();
        let acme = host
            .install_with_state(
                ModuleSpec::new("acme").lazy().class(
                    "com.acme.Plain",
                    ClassFileBuilder::new("com.acme.Plain").build(),
                ),
                ModuleState::Resolved,
            )
            .unwrap();

        acme.load_type("com.acme.Plain").unwrap();
        assert_eq!(acme.state(), ModuleState::Active);
        assert_eq!(acme.activations(), 1);
    }

    #[test]
    fn test_list_entries_with_suffix() {
        let host = ModuleHost::new();
        let acme = host
            .install(
                ModuleSpec::new("acme")
                    .entry("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0".to_vec())
                    .class("com.acme.Plain", ClassFileBuilder::new("com.acme.Plain").build()),
            )
            .unwrap();

        assert_eq!(acme.list_entries(Some(".class")), vec!["com/acme/Plain.class"]);
        assert_eq!(acme.list_entries(None).len(), 2);
    }
}
