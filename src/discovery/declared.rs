use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::DiscoveryStrategy;
use crate::classfile;
use crate::classifier::Classifier;
use crate::container::{Module, ModuleContainer};
use crate::model::TestUnit;

/// Classifies only the types a module lists in a metadata attribute.
pub struct DeclaredListStrategy {
    classifier: Arc<dyn Classifier>,
    key: String,
    delimiter: String,
}

impl DeclaredListStrategy {
    pub fn new(classifier: Arc<dyn Classifier>, key: impl Into<String>, delimiter: impl Into<String>) -> Self {
        Self {
            classifier,
            key: key.into(),
            delimiter: delimiter.into(),
        }
    }

    /// Declared type names, trimmed, blanks dropped, first occurrence kept.
    fn declared_names(&self, raw: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        raw.split(self.delimiter.as_str())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .filter(|name| seen.insert(name.to_string()))
            .map(str::to_string)
            .collect()
    }
}

impl DiscoveryStrategy for DeclaredListStrategy {
    fn name(&self) -> &'static str {
        "declared"
    }

    fn discover(&self, module: &dyn Module, container: &dyn ModuleContainer) -> HashSet<TestUnit> {
        let mut units = HashSet::new();

        let Some(raw) = module.metadata(&self.key) else {
            warn!(module = %module.id(), key = %self.key, "no metadata found for module");
            return units;
        };

        let names = self.declared_names(&raw);
        if names.is_empty() {
            warn!(module = %module.id(), key = %self.key, "metadata declares no test classes");
            return units;
        }

        let mut scan = self.classifier.begin_scan();
        for type_name in names {
            match module.entry(&classfile::entry_path(&type_name)) {
                Ok(Some(_)) => {}
                Ok(None) => {
                    error!(module = %module.id(), class = %type_name, "declared test class not found in module");
                    continue;
                }
                Err(e) => {
                    error!(module = %module.id(), class = %type_name, error = %e, "declared test class unreadable");
                    continue;
                }
            }

            if self
                .classifier
                .classify(module, container, &type_name, &mut scan)
                .is_accepted()
            {
                debug!(module = %module.id(), type_name = %type_name, "discovered declared test unit");
                units.insert(TestUnit::new(module.id().clone(), type_name));
            }
        }

        debug!(module = %module.id(), accepted = units.len(), "declared list scan finished");
        units
    }
}
