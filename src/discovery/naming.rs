use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace};

use super::DiscoveryStrategy;
use crate::classfile;
use crate::classifier::Classifier;
use crate::container::{Module, ModuleContainer};
use crate::model::TestUnit;

const UNIT_PREFIXES: &[&str] = &["Test"];
const UNIT_SUFFIXES: &[&str] = &["Test", "Tests", "TestCase"];
const INTEGRATION_PREFIXES: &[&str] = &["IT"];
const INTEGRATION_SUFFIXES: &[&str] = &["IT", "ITCase"];

const NESTING_SEPARATOR: char = '$';

/// Whether a fully qualified type name follows unit or integration test
/// naming conventions. Nested types never do.
pub fn is_test_name(type_name: &str) -> bool {
    let simple = type_name.rsplit('.').next().unwrap_or(type_name);
    if simple.contains(NESTING_SEPARATOR) {
        return false;
    }

    UNIT_PREFIXES
        .iter()
        .chain(INTEGRATION_PREFIXES)
        .any(|p| simple.starts_with(p))
        || UNIT_SUFFIXES
            .iter()
            .chain(INTEGRATION_SUFFIXES)
            .any(|s| simple.ends_with(s))
}

/// Scans every compiled unit and classifies the ones named like tests.
///
/// The name gate runs first: a type that would classify as a test but is
/// not named like one is never discovered.
pub struct NamingConventionStrategy {
    classifier: Arc<dyn Classifier>,
}

impl NamingConventionStrategy {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }
}

impl DiscoveryStrategy for NamingConventionStrategy {
    fn name(&self) -> &'static str {
        "naming"
    }

    fn discover(&self, module: &dyn Module, container: &dyn ModuleContainer) -> HashSet<TestUnit> {
        let mut scan = self.classifier.begin_scan();
        let mut units = HashSet::new();
        let mut candidates = 0usize;

        for entry in module.list_entries(Some(".class")) {
            let Some(type_name) = classfile::type_name_from_entry(&entry) else {
                continue;
            };
            if !is_test_name(&type_name) {
                trace!(module = %module.id(), type_name, "skipped by naming convention");
                continue;
            }

            candidates += 1;
            if self
                .classifier
                .classify(module, container, &type_name, &mut scan)
                .is_accepted()
            {
                debug!(module = %module.id(), type_name, "discovered test unit");
                units.insert(TestUnit::new(module.id().clone(), type_name));
            }
        }

        debug!(
            module = %module.id(),
            candidates,
            accepted = units.len(),
            "naming convention scan finished"
        );
        units
    }
}
