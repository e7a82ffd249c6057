//! Decides whether a candidate type is a test.
//!
//! Two code paths sit behind [`Classifier`]: reflective inspection through
//! the module's type loader, and a descriptor walk that never touches the
//! loader. The mode is picked from the module's lifecycle state so that
//! scanning never forces a lazily activated module to start.
mod binary;
mod cache;
mod reflective;

pub use cache::ScanCache;

use std::fmt;
use tracing::trace;

use crate::classfile::AccessFlags;
use crate::config::DiscoveryConfig;
use crate::container::{ActivationPolicy, Module, ModuleContainer, ModuleState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierMode {
    Reflective,
    Binary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    NotPublic,
    Interface,
    Enum,
    Annotation,
    Abstract,
    Constructors,
    ExcludedBase,
    NoTestMarkers,
    MissingEntry,
    Unreadable(String),
    LoadFailed(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NotPublic => f.write_str("not public"),
            RejectReason::Interface => f.write_str("interface"),
            RejectReason::Enum => f.write_str("enumeration"),
            RejectReason::Annotation => f.write_str("annotation type"),
            RejectReason::Abstract => f.write_str("abstract"),
            RejectReason::Constructors => f.write_str("unusable constructors"),
            RejectReason::ExcludedBase => f.write_str("lineage base type"),
            RejectReason::NoTestMarkers => f.write_str("no test lineage or markers"),
            RejectReason::MissingEntry => f.write_str("descriptor entry missing"),
            RejectReason::Unreadable(msg) => write!(f, "unreadable descriptor: {msg}"),
            RejectReason::LoadFailed(msg) => write!(f, "type load failed: {msg}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Accepted,
    Rejected(RejectReason),
}

impl Classification {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Classification::Accepted)
    }
}

pub trait Classifier: Send + Sync {
    /// Fresh per-scan cache; one per `discover` call.
    fn begin_scan(&self) -> ScanCache;

    fn classify(
        &self,
        module: &dyn Module,
        container: &dyn ModuleContainer,
        type_name: &str,
        scan: &mut ScanCache,
    ) -> Classification;
}

/// Reflective mode is safe once the module is active, or resolved with an
/// eager policy; anything else would risk activating it.
pub fn select_mode(module: &dyn Module) -> ClassifierMode {
    match (module.state(), module.activation_policy()) {
        (ModuleState::Active, _) => ClassifierMode::Reflective,
        (ModuleState::Resolved, ActivationPolicy::Eager) => ClassifierMode::Reflective,
        _ => ClassifierMode::Binary,
    }
}

#[derive(Debug, Clone, Default)]
pub struct TestClassifier {
    config: DiscoveryConfig,
}

impl TestClassifier {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    pub fn classify_with(
        &self,
        mode: ClassifierMode,
        module: &dyn Module,
        container: &dyn ModuleContainer,
        type_name: &str,
        scan: &mut ScanCache,
    ) -> Classification {
        let outcome = match mode {
            ClassifierMode::Reflective => self.classify_reflective(module, type_name),
            ClassifierMode::Binary => self.classify_binary(module, container, type_name, scan),
        };
        trace!(
            module = %module.id(),
            type_name,
            ?mode,
            ?outcome,
            "classified candidate"
        );
        outcome
    }
}

impl Classifier for TestClassifier {
    fn begin_scan(&self) -> ScanCache {
        ScanCache::new(self.config.legacy_test_base.clone())
    }

    fn classify(
        &self,
        module: &dyn Module,
        container: &dyn ModuleContainer,
        type_name: &str,
        scan: &mut ScanCache,
    ) -> Classification {
        self.classify_with(select_mode(module), module, container, type_name, scan)
    }
}

/// What either code path learned about a candidate.
struct Evidence<'a> {
    access: AccessFlags,
    constructors: &'a [AccessFlags],
    lineage: bool,
    markers: bool,
    excluded: bool,
}

fn judge(evidence: Evidence<'_>) -> Classification {
    let access = evidence.access;
    let reject = |reason| Classification::Rejected(reason);

    if access.is_annotation() {
        return reject(RejectReason::Annotation);
    }
    if access.is_interface() {
        return reject(RejectReason::Interface);
    }
    if access.is_enum() {
        return reject(RejectReason::Enum);
    }
    if access.is_abstract() {
        return reject(RejectReason::Abstract);
    }
    if !access.is_public() {
        return reject(RejectReason::NotPublic);
    }
    if evidence.excluded {
        return reject(RejectReason::ExcludedBase);
    }
    if !evidence.lineage && !evidence.markers {
        return reject(RejectReason::NoTestMarkers);
    }

    let public_constructors = evidence
        .constructors
        .iter()
        .filter(|c| c.is_public())
        .count();
    if public_constructors == 0 {
        return reject(RejectReason::Constructors);
    }
    // Marker-only tests are instantiated through their single constructor.
    if !evidence.lineage && evidence.constructors.len() != 1 {
        return reject(RejectReason::Constructors);
    }

    Classification::Accepted
}
