use tracing::warn;

use super::{judge, Classification, Evidence, RejectReason, TestClassifier};
use crate::container::Module;

impl TestClassifier {
    /// Classifies through the module's type loader.
    ///
    /// Load failures are expected for candidates whose dependencies are not
    /// wired; they reject the candidate and never abort the scan.
    pub(super) fn classify_reflective(&self, module: &dyn Module, type_name: &str) -> Classification {
        let loaded = match module.load_type(type_name) {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(
                    module = %module.id(),
                    type_name,
                    error = %e,
                    "failed to load candidate type"
                );
                return Classification::Rejected(RejectReason::LoadFailed(e.to_string()));
            }
        };

        let config = &self.config;
        judge(Evidence {
            access: loaded.access,
            constructors: &loaded.constructors,
            lineage: loaded.inherits_from(&config.legacy_test_base),
            markers: loaded
                .method_annotations
                .iter()
                .any(|a| config.test_annotations.contains(a))
                || loaded
                    .type_annotations
                    .iter()
                    .any(|a| config.suite_annotations.contains(a)),
            excluded: config.is_excluded_base(&loaded.name),
        })
    }
}
