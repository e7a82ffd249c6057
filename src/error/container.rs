use std::path::PathBuf;
use thiserror::Error;

use super::ParserError;

#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("module not found: {id}")]
    ModuleNotFound { id: String },

    #[error("module already installed: {id}")]
    ModuleAlreadyInstalled { id: String },

    #[error("module root not found for '{id}': {path}")]
    ModuleRootNotFound { id: String, path: PathBuf },

    #[error("type {name} not found in module {module}")]
    TypeNotFound { module: String, name: String },

    #[error("type {name} in module {module} links against unresolved type {missing}")]
    UnresolvedType {
        module: String,
        name: String,
        missing: String,
    },

    #[error("failed to read entry '{path}': {source}")]
    EntryRead {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed descriptor for {name}: {source}")]
    MalformedType { name: String, source: ParserError },

    #[error("failed to scan module directory at {path}: {source}")]
    DirectoryScan {
        path: PathBuf,
        source: walkdir::Error,
    },
}

impl ContainerError {
    pub fn module_not_found(id: impl Into<String>) -> Self {
        Self::ModuleNotFound { id: id.into() }
    }

    pub fn module_already_installed(id: impl Into<String>) -> Self {
        Self::ModuleAlreadyInstalled { id: id.into() }
    }

    pub fn type_not_found(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self::TypeNotFound {
            module: module.into(),
            name: name.into(),
        }
    }

    pub fn unresolved_type(
        module: impl Into<String>,
        name: impl Into<String>,
        missing: impl Into<String>,
    ) -> Self {
        Self::UnresolvedType {
            module: module.into(),
            name: name.into(),
            missing: missing.into(),
        }
    }

    pub fn entry_read(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::EntryRead {
            path: path.into(),
            source,
        }
    }

    pub fn malformed_type(name: impl Into<String>, source: ParserError) -> Self {
        Self::MalformedType {
            name: name.into(),
            source,
        }
    }
}
