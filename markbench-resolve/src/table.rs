//! Benchmark tables
//!
//! A serialized `(type, parent, methods)` table, for generators that emit
//! descriptors as data instead of going through `#[suite]`. Tables carry no
//! entry points, so benchmarks loaded from them resolve but do not run.

use crate::error::ResolveError;
use crate::registry::{MethodInfo, SourceLocation, TypeInfo, TypeRegistry};
use markbench_core::BenchmarkType;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors from reading a table
#[derive(Debug, Error)]
pub enum TableError {
    /// File could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed TOML
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Well-formed but inconsistent contents
    #[error(transparent)]
    Invalid(#[from] ResolveError),
}

/// Serialized descriptor table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkTable {
    /// Types in declaration order
    #[serde(default)]
    pub types: Vec<TypeRecord>,
}

/// One type in a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRecord {
    /// Fully-qualified name
    pub name: String,
    /// Fully-qualified parent name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Declaration site
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    /// Methods in declaration order
    #[serde(default)]
    pub methods: Vec<MethodRecord>,
}

/// One method in a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodRecord {
    /// Method name
    pub name: String,
    /// Marker mode name; absent when unmarked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Declared return type text
    #[serde(default = "default_returns")]
    pub returns: String,
    /// Declared parameter type texts
    #[serde(default)]
    pub params: Vec<String>,
    /// Tool-generated
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub synthetic: bool,
    /// Declaration site
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

fn default_returns() -> String {
    "()".to_string()
}

impl BenchmarkTable {
    /// Parse a JSON table
    pub fn from_json(text: &str) -> Result<Self, TableError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse a TOML table
    pub fn from_toml(text: &str) -> Result<Self, TableError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a table file; `.toml` is TOML, anything else JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&text),
            _ => Self::from_json(&text),
        }
    }

    /// Snapshot a registry as a table (entry points are dropped)
    pub fn from_registry(registry: &TypeRegistry) -> Self {
        let types = registry
            .types()
            .into_iter()
            .map(|ty| TypeRecord {
                name: ty.name().to_string(),
                parent: ty.parent_name().map(str::to_string),
                location: ty.info().location.clone(),
                methods: ty
                    .declared_methods()
                    .iter()
                    .map(|m| MethodRecord {
                        name: m.name.clone(),
                        mode: m.marker.map(|mode| mode.to_string()),
                        returns: m.returns.clone(),
                        params: m.params.clone(),
                        synthetic: m.synthetic,
                        location: m.location.clone(),
                    })
                    .collect(),
            })
            .collect();
        Self { types }
    }

    /// Build a registry, rejecting unknown modes
    pub fn into_registry(self) -> Result<TypeRegistry, ResolveError> {
        let mut registry = TypeRegistry::new();
        for ty in &self.types {
            registry.add_type(TypeInfo {
                name: ty.name.clone(),
                parent: ty.parent.clone(),
                location: ty.location.clone(),
            });
        }

        for ty in self.types {
            for record in ty.methods {
                let mut method = MethodInfo::new(&ty.name, record.name, &record.params, &record.returns);
                if let Some(mode) = &record.mode {
                    method = method.marked(mode.parse::<BenchmarkType>()?);
                }
                if record.synthetic {
                    method = method.synthetic();
                }
                if let Some(location) = record.location {
                    method = method.at(location);
                }
                registry.add_method(method)?;
            }
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::resolver::resolve_qualified;

    const TOML_TABLE: &str = r#"
        [[types]]
        name = "app::Base"

        [[types.methods]]
        name = "shared"
        mode = "single-shot"
        returns = "RunResult"
        params = ["& mut Loop"]

        [[types]]
        name = "app::Suite"
        parent = "app::Base"

        [[types.methods]]
        name = "run_a"
        mode = "loop"
        returns = "RunResult"
        params = ["&mut Loop"]
        location = { file = "benches/suite.rs", line = 14 }

        [[types.methods]]
        name = "helper"
    "#;

    #[test]
    fn test_toml_table_resolves() {
        let registry = BenchmarkTable::from_toml(TOML_TABLE)
            .unwrap()
            .into_registry()
            .unwrap();

        let a = resolve_qualified(&registry, "app::Suite::run_a").unwrap();
        assert_eq!(a.mode(), BenchmarkType::Loop);
        assert_eq!(
            a.method().location,
            Some(SourceLocation::new("benches/suite.rs", 14))
        );
        assert!(a.runner().is_none());

        let shared = resolve_qualified(&registry, "app::Suite::shared").unwrap();
        assert_eq!(shared.owner(), "app::Base");
        assert_eq!(shared.mode(), BenchmarkType::SingleShot);

        let helper = resolve_qualified(&registry, "app::Suite::helper").unwrap_err();
        assert_eq!(helper.kind(), ErrorKind::MethodNotFound);
    }

    #[test]
    fn test_json_table() {
        let json = r#"{"types":[{"name":"Bad","methods":[
            {"name":"run_x","mode":"loop","returns":"u64","params":["&mut Loop"]}
        ]}]}"#;
        let registry = BenchmarkTable::from_json(json)
            .unwrap()
            .into_registry()
            .unwrap();
        let err = resolve_qualified(&registry, "Bad::run_x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSignature);
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let json = r#"{"types":[{"name":"S","methods":[
            {"name":"run","mode":"sample-time","returns":"RunResult","params":["&mut Loop"]}
        ]}]}"#;
        let err = BenchmarkTable::from_json(json)
            .unwrap()
            .into_registry()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownBenchmarkType);
    }

    #[test]
    fn test_registry_snapshot_round_trips() {
        let table = BenchmarkTable::from_toml(TOML_TABLE).unwrap();
        let registry = table.clone().into_registry().unwrap();
        let snapshot = BenchmarkTable::from_registry(&registry);

        assert_eq!(snapshot.types.len(), 2);
        let suite = snapshot
            .types
            .iter()
            .find(|t| t.name == "app::Suite")
            .unwrap();
        assert_eq!(suite.parent.as_deref(), Some("app::Base"));
        assert_eq!(suite.methods[0].mode.as_deref(), Some("loop"));
        assert_eq!(suite.methods[1].returns, "()");

        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(BenchmarkTable::from_json(&json).unwrap(), snapshot);
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.toml");
        std::fs::write(&path, TOML_TABLE).unwrap();

        let table = BenchmarkTable::load(&path).unwrap();
        assert_eq!(table.types.len(), 2);

        let missing = BenchmarkTable::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(missing, TableError::Io(_)));
    }
}
