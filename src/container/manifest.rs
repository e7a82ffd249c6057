//! Populates a [`ModuleHost`] from a workspace manifest on disk.
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::{ActivationPolicy, ModuleHost, ModuleSpec, ModuleState};
use crate::error::{ConfigError, ContainerError, Result};
use crate::model::ModuleId;

const CLASS_EXTENSION: &str = "class";

#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceManifest {
    #[serde(default)]
    pub modules: Vec<ModuleEntry>,

    /// Directory module roots are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModuleEntry {
    pub id: String,
    pub root: PathBuf,
    #[serde(default = "default_state")]
    pub state: ModuleState,
    #[serde(default)]
    pub activation: ActivationPolicy,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub imports: HashMap<String, Vec<String>>,
}

fn default_state() -> ModuleState {
    ModuleState::Installed
}

impl WorkspaceManifest {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading workspace manifest");

        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e.to_string()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let mut manifest: Self = match extension {
            "json" => serde_json::from_str(&content)
                .map_err(|e| ConfigError::parse_error(path, e.to_string()))?,
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .map_err(|e| ConfigError::parse_error(path, e.to_string()))?,
            _ => return Err(ConfigError::unsupported_format(extension).into()),
        };

        manifest.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(manifest)
    }

    /// Reads every module's compiled units and installs them in manifest order.
    pub fn install_into(&self, host: &ModuleHost) -> Result<usize> {
        for entry in &self.modules {
            let spec = entry.to_spec(&self.base_dir)?;
            host.install_with_state(spec, entry.state)?;
        }
        info!(modules = self.modules.len(), "installed workspace modules");
        Ok(self.modules.len())
    }
}

impl ModuleEntry {
    fn to_spec(&self, base_dir: &Path) -> Result<ModuleSpec> {
        let root = base_dir.join(&self.root);
        if !root.is_dir() {
            return Err(ContainerError::ModuleRootNotFound {
                id: self.id.clone(),
                path: root,
            }
            .into());
        }

        let mut spec = ModuleSpec::new(self.id.as_str());
        spec.activation = self.activation;
        spec.metadata = self.metadata.clone();
        spec.imports = self
            .imports
            .iter()
            .map(|(package, providers)| {
                (package.clone(), providers.iter().map(ModuleId::new).collect())
            })
            .collect();

        for file in walk_class_files(&root)? {
            let bytes = fs::read(&file)
                .map_err(|e| ContainerError::entry_read(file.display().to_string(), e))?;
            let Some(entry) = entry_name(&root, &file) else {
                continue;
            };
            spec.entries.insert(entry, bytes);
        }

        debug!(module = %self.id, root = %root.display(), entries = spec.entries.len(), "read module root");
        Ok(spec)
    }
}

fn walk_class_files(root: &Path) -> std::result::Result<Vec<PathBuf>, ContainerError> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root).sort_by_file_name().into_iter().filter_entry(|e| {
        e.depth() == 0 || !(e.file_type().is_dir() && e.file_name().to_string_lossy().starts_with('.'))
    });
    for entry in walker {
        let entry = entry.map_err(|e| ContainerError::DirectoryScan {
            path: root.to_path_buf(),
            source: e,
        })?;
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == CLASS_EXTENSION)
        {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Slash-separated entry path of `file` relative to `root`.
fn entry_name(root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::ClassFileBuilder;
    use crate::container::{Module, ModuleContainer};
    use crate::error::Error;
    use tempfile::TempDir;

    fn write_class(root: &Path, type_name: &str) {
        let path = root.join(crate::classfile::entry_path(type_name));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, ClassFileBuilder::new(type_name).build()).unwrap();
    }

    fn installed(manifest: &Path) -> Result<ModuleHost> {
        let host = ModuleHost::new();
        WorkspaceManifest::load(manifest)?.install_into(&host)?;
        Ok(host)
    }

    #[test]
    fn test_load_yaml_manifest() {
        let dir = TempDir::new().unwrap();
        let classes = dir.path().join("acme/classes");
        write_class(&classes, "com.acme.FooTest");
        write_class(&classes, "com.acme.Helper");
        write_class(&classes.join(".cache"), "com.acme.Hidden");
        fs::write(classes.join("README.txt"), "not a class").unwrap();

        let manifest = dir.path().join("workspace.yaml");
        fs::write(
            &manifest,
            r#"
modules:
  - id: acme
    root: acme/classes
    state: active
    activation: lazy
    metadata:
      Test-Classes: com.acme.FooTest
    imports:
      com.acme.base: [acme-base]
"#,
        )
        .unwrap();

        let host = installed(&manifest).unwrap();
        let module = host.module(&ModuleId::new("acme")).unwrap();

        assert_eq!(module.state(), ModuleState::Active);
        assert_eq!(module.activation_policy(), ActivationPolicy::Lazy);
        assert_eq!(
            module.list_entries(None),
            vec!["com/acme/FooTest.class", "com/acme/Helper.class"]
        );
        assert_eq!(module.metadata("Test-Classes").as_deref(), Some("com.acme.FooTest"));
        assert_eq!(module.dependency_providers("com.acme.base"), vec![ModuleId::new("acme-base")]);
    }

    #[test]
    fn test_json_manifest_defaults() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("empty")).unwrap();
        let manifest = dir.path().join("workspace.json");
        fs::write(&manifest, r#"{"modules": [{"id": "empty", "root": "empty"}]}"#).unwrap();

        let host = installed(&manifest).unwrap();
        let module = host.module(&ModuleId::new("empty")).unwrap();
        assert_eq!(module.state(), ModuleState::Installed);
        assert_eq!(module.activation_policy(), ActivationPolicy::Eager);
        assert!(module.list_entries(None).is_empty());
    }

    #[test]
    fn test_missing_root_is_reported() {
        let dir = TempDir::new().unwrap();
        let manifest = dir.path().join("workspace.yml");
        fs::write(&manifest, "modules:\n  - id: ghost\n    root: nowhere\n").unwrap();

        let Err(err) = installed(&manifest) else {
            panic!("missing module root should fail");
        };
        assert!(matches!(
            err,
            Error::Container(ContainerError::ModuleRootNotFound { ref id, .. }) if id == "ghost"
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let manifest = dir.path().join("workspace.toml");
        fs::write(&manifest, "").unwrap();

        assert!(matches!(
            WorkspaceManifest::load(&manifest),
            Err(Error::Config(ConfigError::UnsupportedFormat { .. }))
        ));
    }

    #[test]
    fn test_entry_name_uses_forward_slashes() {
        let root = Path::new("/tmp/root");
        assert_eq!(
            entry_name(root, &root.join("com").join("acme").join("A.class")).as_deref(),
            Some("com/acme/A.class")
        );
        assert_eq!(entry_name(root, Path::new("/elsewhere/A.class")), None);
    }
}
