use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

use crate::discovery::StrategyKind;
use crate::error::ConfigError;

pub const LEGACY_TEST_BASE: &str = "junit.framework.TestCase";
pub const SUITE_HOLDER: &str = "junit.framework.TestSuite";

pub const DEFAULT_TEST_ANNOTATIONS: &[&str] = &["org.junit.Test", "org.junit.jupiter.api.Test"];
pub const DEFAULT_SUITE_ANNOTATIONS: &[&str] = &[
    "org.junit.runner.RunWith",
    "org.junit.runners.Suite$SuiteClasses",
];
pub const DEFAULT_PLATFORM_PREFIXES: &[&str] = &["java.", "javax.", "jdk.", "sun."];

pub const DECLARED_TESTS_KEY: &str = "Test-Classes";
pub const DECLARED_TESTS_DELIMITER: &str = ",";
pub const MAX_LINEAGE_DEPTH: usize = 64;

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Tunables for classification and candidate enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct DiscoveryConfig {
    /// Root of the legacy test lineage.
    pub legacy_test_base: String,
    /// Types in the lineage that are never discovered themselves.
    pub excluded_bases: Vec<String>,
    pub test_annotations: Vec<String>,
    pub suite_annotations: Vec<String>,
    pub platform_prefixes: Vec<String>,
    pub declared_tests_key: String,
    pub declared_tests_delimiter: String,
    pub max_lineage_depth: usize,
    pub strategy: StrategyKind,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            legacy_test_base: LEGACY_TEST_BASE.to_string(),
            excluded_bases: owned(&[LEGACY_TEST_BASE, SUITE_HOLDER]),
            test_annotations: owned(DEFAULT_TEST_ANNOTATIONS),
            suite_annotations: owned(DEFAULT_SUITE_ANNOTATIONS),
            platform_prefixes: owned(DEFAULT_PLATFORM_PREFIXES),
            declared_tests_key: DECLARED_TESTS_KEY.to_string(),
            declared_tests_delimiter: DECLARED_TESTS_DELIMITER.to_string(),
            max_lineage_depth: MAX_LINEAGE_DEPTH,
            strategy: StrategyKind::Naming,
        }
    }
}

impl DiscoveryConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading discovery config");

        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::read_error(path, e.to_string()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let config: Self = match extension {
            "json" => serde_json::from_str(&content)
                .map_err(|e| ConfigError::parse_error(path, e.to_string()))?,
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .map_err(|e| ConfigError::parse_error(path, e.to_string()))?,
            _ => return Err(ConfigError::unsupported_format(extension)),
        };

        trace!(?config, "loaded discovery config");
        Ok(config)
    }

    pub fn is_platform_type(&self, type_name: &str) -> bool {
        self.platform_prefixes
            .iter()
            .any(|p| type_name.starts_with(p.as_str()))
    }

    pub fn is_excluded_base(&self, type_name: &str) -> bool {
        self.excluded_bases.iter().any(|b| b == type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.legacy_test_base, "junit.framework.TestCase");
        assert!(config.is_excluded_base("junit.framework.TestCase"));
        assert!(config.is_excluded_base("junit.framework.TestSuite"));
        assert!(config.is_platform_type("java.lang.Object"));
        assert!(!config.is_platform_type("com.acme.Base"));
        assert_eq!(config.strategy, StrategyKind::Naming);
    }

    #[test]
    fn test_load_yaml_keeps_unset_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("discovery.yaml");
        fs::write(&path, "strategy: declared\ndeclared_tests_key: X-Tests\n").unwrap();

        let config = DiscoveryConfig::load(&path).unwrap();
        assert_eq!(config.strategy, StrategyKind::Declared);
        assert_eq!(config.declared_tests_key, "X-Tests");
        assert_eq!(config.max_lineage_depth, MAX_LINEAGE_DEPTH);
    }

    #[test]
    fn test_load_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("discovery.json");
        fs::write(&path, r#"{"legacy_test_base": "org.acme.LegacyCase"}"#).unwrap();

        let config = DiscoveryConfig::load(&path).unwrap();
        assert_eq!(config.legacy_test_base, "org.acme.LegacyCase");
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("discovery.toml");
        fs::write(&path, "").unwrap();

        let err = DiscoveryConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
    }
}
