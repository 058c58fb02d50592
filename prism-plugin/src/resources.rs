//! Resource registry
//!
//! Files, database connections and tables known to the host. The registry is
//! populated before any configuration is resolved and only read afterwards,
//! so it is shared behind an `Arc` by every factory.

use prism_core::{DatabaseConnection, TableInput};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("failed to read resource manifest '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid resource manifest '{path}'")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("table '{table}' refers to unknown connection '{connection}'")]
    UnknownConnection { connection: String, table: String },
}

/// A file made available to algorithms under a logical name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredFile {
    pub name: String,
    pub path: PathBuf,
}

/// Table entry in a resource manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    pub connection: String,
    pub table: String,
}

/// On-disk description of the resources to register
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceManifest {
    #[serde(default)]
    pub files: Vec<RegisteredFile>,
    #[serde(default)]
    pub connections: Vec<DatabaseConnection>,
    #[serde(default)]
    pub tables: Vec<TableEntry>,
}

impl ResourceManifest {
    pub fn load(path: &Path) -> Result<Self, ResourceError> {
        let content = fs::read_to_string(path).map_err(|source| ResourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ResourceError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Lookup table for everything a typed input reference can point at
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    files: BTreeMap<String, RegisteredFile>,
    connections: BTreeMap<String, DatabaseConnection>,
    tables: BTreeMap<String, BTreeSet<String>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let name = name.into();
        let path = path.into();
        debug!(file = %name, path = %path.display(), "file registered");
        self.files.insert(name.clone(), RegisteredFile { name, path });
        self
    }

    pub fn with_connection(mut self, connection: DatabaseConnection) -> Self {
        debug!(connection = %connection.identifier, "connection registered");
        self.connections.insert(connection.identifier.clone(), connection);
        self
    }

    /// Register a table; its connection must already be registered
    pub fn with_table(mut self, connection: &str, table: impl Into<String>) -> Result<Self, ResourceError> {
        let table = table.into();
        if !self.connections.contains_key(connection) {
            return Err(ResourceError::UnknownConnection {
                connection: connection.to_string(),
                table,
            });
        }
        self.tables.entry(connection.to_string()).or_default().insert(table);
        Ok(self)
    }

    /// Build a registry from a manifest. Relative file paths are resolved
    /// against `base_dir`.
    pub fn from_manifest(manifest: ResourceManifest, base_dir: &Path) -> Result<Self, ResourceError> {
        let mut registry = ResourceRegistry::new();
        for file in manifest.files {
            let path = if file.path.is_relative() {
                base_dir.join(&file.path)
            } else {
                file.path
            };
            registry = registry.with_file(file.name, path);
        }
        for connection in manifest.connections {
            registry = registry.with_connection(connection);
        }
        for entry in manifest.tables {
            registry = registry.with_table(&entry.connection, entry.table)?;
        }
        info!(
            files = registry.files.len(),
            connections = registry.connections.len(),
            tables = registry.tables.values().map(BTreeSet::len).sum::<usize>(),
            "resources loaded"
        );
        Ok(registry)
    }

    /// Load a manifest file; relative paths resolve next to it
    pub fn load(path: &Path) -> Result<Self, ResourceError> {
        let manifest = ResourceManifest::load(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_manifest(manifest, base_dir)
    }

    // ========== Lookups ==========

    pub fn file(&self, name: &str) -> Option<&RegisteredFile> {
        self.files.get(name)
    }

    pub fn connection(&self, identifier: &str) -> Option<&DatabaseConnection> {
        self.connections.get(identifier)
    }

    pub fn table(&self, connection: &str, table: &str) -> Option<TableInput> {
        let known = self.tables.get(connection)?.contains(table);
        if !known {
            return None;
        }
        self.connection(connection).map(|c| TableInput {
            connection: c.clone(),
            table_name: table.to_string(),
        })
    }

    // ========== Listings ==========

    pub fn files(&self) -> impl Iterator<Item = &RegisteredFile> {
        self.files.values()
    }

    pub fn connections(&self) -> impl Iterator<Item = &DatabaseConnection> {
        self.connections.values()
    }

    pub fn tables(&self) -> impl Iterator<Item = TableEntry> + '_ {
        self.tables.iter().flat_map(|(connection, tables)| {
            tables.iter().map(move |table| TableEntry {
                connection: connection.clone(),
                table: table.clone(),
            })
        })
    }

    /// Snapshot of the registered resources in manifest form
    pub fn to_manifest(&self) -> ResourceManifest {
        ResourceManifest {
            files: self.files().cloned().collect(),
            connections: self.connections().cloned().collect(),
            tables: self.tables().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::DbSystem;
    use std::io::Write;

    fn pg() -> DatabaseConnection {
        DatabaseConnection {
            identifier: "pg".to_string(),
            url: "postgresql://localhost/shop".to_string(),
            system: DbSystem::Postgresql,
            username: Some("profiler".to_string()),
        }
    }

    #[test]
    fn test_lookups() {
        let registry = ResourceRegistry::new()
            .with_file("people.csv", "/data/people.csv")
            .with_connection(pg())
            .with_table("pg", "orders")
            .unwrap();

        assert_eq!(registry.file("people.csv").unwrap().path, PathBuf::from("/data/people.csv"));
        assert!(registry.file("other.csv").is_none());
        assert_eq!(registry.connection("pg").unwrap().system, DbSystem::Postgresql);
        assert_eq!(registry.table("pg", "orders").unwrap().table_name, "orders");
        assert!(registry.table("pg", "customers").is_none());
        assert!(registry.table("mysql", "orders").is_none());
    }

    #[test]
    fn test_table_requires_connection() {
        let err = ResourceRegistry::new().with_table("pg", "orders").unwrap_err();
        assert!(matches!(err, ResourceError::UnknownConnection { .. }));
    }

    #[test]
    fn test_manifest_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("resources.json");
        let mut file = fs::File::create(&manifest_path).unwrap();
        write!(
            file,
            r#"{{
                "files": [{{"name": "people.csv", "path": "people.csv"}}],
                "connections": [{{"identifier": "pg", "url": "postgresql://localhost/shop", "system": "postgresql"}}],
                "tables": [{{"connection": "pg", "table": "orders"}}]
            }}"#
        )
        .unwrap();

        let registry = ResourceRegistry::load(&manifest_path).unwrap();
        assert_eq!(registry.file("people.csv").unwrap().path, dir.path().join("people.csv"));
        assert_eq!(registry.tables().count(), 1);
        assert_eq!(registry.to_manifest().connections.len(), 1);
    }

    #[test]
    fn test_manifest_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("resources.json");
        fs::write(&manifest_path, "not json").unwrap();
        assert!(matches!(
            ResourceRegistry::load(&manifest_path),
            Err(ResourceError::Parse { .. })
        ));
    }
}
