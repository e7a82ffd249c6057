//! The module container the discovery engine observes.
//!
//! The engine never creates or destroys modules; it only reads them through
//! these traits. [`host::ModuleHost`] is the in-process implementation used
//! by the CLI and tests.
pub mod host;
pub mod manifest;

pub use host::{HostedModule, ModuleHost, ModuleSpec};
pub use manifest::WorkspaceManifest;

use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::classfile::AccessFlags;
use crate::error::ContainerError;
use crate::model::ModuleId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleState {
    Installed,
    Resolved,
    Active,
    Stopping,
    Uninstalled,
}

impl ModuleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleState::Installed => "installed",
            ModuleState::Resolved => "resolved",
            ModuleState::Active => "active",
            ModuleState::Stopping => "stopping",
            ModuleState::Uninstalled => "uninstalled",
        }
    }
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a resolved module is activated on first type load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationPolicy {
    #[default]
    Eager,
    Lazy,
}

/// Reflective handle returned by a module's type loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedType {
    pub name: String,
    pub access: AccessFlags,
    /// Superclass chain, nearest first.
    pub ancestors: Vec<String>,
    pub constructors: Vec<AccessFlags>,
    pub type_annotations: BTreeSet<String>,
    pub method_annotations: BTreeSet<String>,
}

impl LoadedType {
    pub fn inherits_from(&self, type_name: &str) -> bool {
        self.ancestors.iter().any(|a| a == type_name)
    }
}

pub trait Module: Send + Sync {
    fn id(&self) -> &ModuleId;

    fn state(&self) -> ModuleState;

    fn activation_policy(&self) -> ActivationPolicy;

    /// Entry paths contained in the module, optionally limited to a suffix.
    fn list_entries(&self, suffix: Option<&str>) -> Vec<String>;

    fn entry(&self, path: &str) -> Result<Option<Vec<u8>>, ContainerError>;

    /// Loads a type through the module's loader. May activate the module.
    fn load_type(&self, name: &str) -> Result<LoadedType, ContainerError>;

    fn metadata(&self, key: &str) -> Option<String>;

    /// Modules supplying types of `package` to this module, in wiring order.
    fn dependency_providers(&self, package: &str) -> Vec<ModuleId>;
}

pub trait LifecycleListener: Send + Sync {
    fn module_changed(&self, module: &Arc<dyn Module>, state: ModuleState);
}

pub trait ModuleContainer: Send + Sync {
    fn list_modules(&self) -> Vec<Arc<dyn Module>>;

    fn module(&self, id: &ModuleId) -> Option<Arc<dyn Module>>;

    fn subscribe(&self, listener: Arc<dyn LifecycleListener>);
}
