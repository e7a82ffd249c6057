/// modscout
///
/// Module-aware test discovery. Watches a container of independently
/// versioned modules, finds the test types each one carries, and keeps a
/// live registry of them that follows module install and removal.
pub mod classfile;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod container;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod model;
pub mod observer;
pub mod registry;

pub use classifier::{Classification, Classifier, ClassifierMode, TestClassifier};
pub use config::DiscoveryConfig;
pub use container::{Module, ModuleContainer, ModuleHost, ModuleSpec, ModuleState};
pub use discovery::{create_strategy, DiscoveryStrategy, StrategyKind};
pub use error::{Error, Result};
pub use model::{ChangeEvent, ChangeKind, ModuleId, TestUnit};
pub use observer::ModuleLifecycleObserver;
pub use registry::{ChangeListener, RegistryStore, TestRegistry};
