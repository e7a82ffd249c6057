use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Opaque identity of an installable module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(Arc<str>);

impl ModuleId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ModuleId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ModuleId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

/// One discovered test type, identified by its owning module and type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TestUnit {
    module: ModuleId,
    type_name: String,
}

impl TestUnit {
    pub fn new(module: ModuleId, type_name: impl Into<String>) -> Self {
        Self {
            module,
            type_name: type_name.into(),
        }
    }

    pub fn module(&self) -> &ModuleId {
        &self.module
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// External id: `<module-identity>@<fully-qualified-type-name>`.
    ///
    /// Consumers persist and match against this string, so the format is fixed.
    pub fn id(&self) -> String {
        format!("{}@{}", self.module, self.type_name)
    }
}

impl fmt::Display for TestUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.module, self.type_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Add,
    Remove,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Add => "add",
            ChangeKind::Remove => "remove",
        }
    }
}

/// Immutable record of one unit entering or leaving the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    kind: ChangeKind,
    unit: TestUnit,
}

impl ChangeEvent {
    pub fn added(unit: TestUnit) -> Self {
        Self {
            kind: ChangeKind::Add,
            unit,
        }
    }

    pub fn removed(unit: TestUnit) -> Self {
        Self {
            kind: ChangeKind::Remove,
            unit,
        }
    }

    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    pub fn unit(&self) -> &TestUnit {
        &self.unit
    }
}
