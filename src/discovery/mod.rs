//! Candidate enumeration policies.
//!
//! A strategy decides which compiled units of a module are worth asking the
//! classifier about; the classifier has the final say on each one.
pub mod declared;
pub mod naming;

pub use declared::DeclaredListStrategy;
pub use naming::{is_test_name, NamingConventionStrategy};

use clap::ValueEnum;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::classifier::{Classifier, TestClassifier};
use crate::config::DiscoveryConfig;
use crate::container::{Module, ModuleContainer};
use crate::model::TestUnit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Every compiled unit whose simple name follows test naming conventions
    #[default]
    Naming,
    /// Only the units listed in the module's metadata
    Declared,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Naming => "naming",
            StrategyKind::Declared => "declared",
        }
    }
}

pub trait DiscoveryStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Accepted units of `module`. Calling twice on an unchanged module
    /// yields equal sets.
    fn discover(&self, module: &dyn Module, container: &dyn ModuleContainer) -> HashSet<TestUnit>;
}

/// Builds the strategy selected by `config`, backed by a [`TestClassifier`].
pub fn create_strategy(config: &DiscoveryConfig) -> Box<dyn DiscoveryStrategy> {
    let classifier: Arc<dyn Classifier> = Arc::new(TestClassifier::new(config.clone()));
    match config.strategy {
        StrategyKind::Naming => Box::new(NamingConventionStrategy::new(classifier)),
        StrategyKind::Declared => Box::new(DeclaredListStrategy::new(
            classifier,
            config.declared_tests_key.clone(),
            config.declared_tests_delimiter.clone(),
        )),
    }
}
