//! Adapter selection: a fixed alias table resolving to canonical descriptors,
//! and a registry of linked factories that builds the selected adapter.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::domain::ports::Adapter;
use crate::utils::error::{AdapterError, Result};

/// Options handed to an adapter factory. Validation is the adapter's job.
pub type AdapterOptions = Map<String, Value>;

pub type AdapterFactory = fn(AdapterOptions) -> Result<Box<dyn Adapter>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    Sql,
    Nosql,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Sql => "sql",
            StorageType::Nosql => "nosql",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdapterDescriptor {
    pub name: &'static str,
    pub path: &'static str,
    pub lib: Option<&'static str>,
    pub storage_type: StorageType,
}

pub const ADAPTERS: &[AdapterDescriptor] = &[
    AdapterDescriptor {
        name: "postgres",
        path: "sql/postgres",
        lib: Some("pg"),
        storage_type: StorageType::Sql,
    },
    AdapterDescriptor {
        name: "mysql",
        path: "sql/mysql",
        lib: Some("mysql"),
        storage_type: StorageType::Sql,
    },
    AdapterDescriptor {
        name: "sqlite",
        path: "sql/sqlite",
        lib: Some("sqlite3"),
        storage_type: StorageType::Sql,
    },
    AdapterDescriptor {
        name: "rest",
        path: "rest/index",
        lib: None,
        storage_type: StorageType::Nosql,
    },
    AdapterDescriptor {
        name: "riak",
        path: "riak/index",
        lib: None,
        storage_type: StorageType::Nosql,
    },
    AdapterDescriptor {
        name: "mongo",
        path: "mongo/index",
        lib: Some("mongodb"),
        storage_type: StorageType::Nosql,
    },
    AdapterDescriptor {
        name: "memory",
        path: "memory/index",
        lib: None,
        storage_type: StorageType::Nosql,
    },
    AdapterDescriptor {
        name: "filesystem",
        path: "filesystem/index",
        lib: None,
        storage_type: StorageType::Nosql,
    },
    AdapterDescriptor {
        name: "level",
        path: "level/index",
        lib: Some("level"),
        storage_type: StorageType::Nosql,
    },
];

/// Accepted alias -> canonical name.
pub const ALIASES: &[(&str, &str)] = &[
    ("postgres", "postgres"),
    ("pg", "postgres"),
    ("postgresql", "postgres"),
    ("mysql", "mysql"),
    ("sqlite", "sqlite"),
    ("rest", "rest"),
    ("riak", "riak"),
    ("mongo", "mongo"),
    ("mongodb", "mongo"),
    ("memory", "memory"),
    ("filesystem", "filesystem"),
    ("level", "level"),
];

/// Case-sensitive exact lookup of an alias or canonical name.
pub fn resolve(name: &str) -> Option<&'static AdapterDescriptor> {
    let canonical = ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| *canonical)?;
    ADAPTERS.iter().find(|d| d.name == canonical)
}

/// Factories linked into this process, keyed by canonical adapter name.
pub struct AdapterRegistry {
    factories: HashMap<&'static str, AdapterFactory>,
}

impl AdapterRegistry {
    /// Empty registry; every descriptor resolves but none can be built.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Links a backend implementation under any accepted alias.
    pub fn register(&mut self, name: &str, factory: AdapterFactory) -> Result<()> {
        let descriptor = resolve(name).ok_or_else(|| AdapterError::UnknownAdapter {
            name: name.to_string(),
        })?;
        tracing::debug!(adapter = descriptor.name, "registered adapter factory");
        self.factories.insert(descriptor.name, factory);
        Ok(())
    }

    pub fn descriptor(&self, name: &str) -> Option<&'static AdapterDescriptor> {
        resolve(name)
    }

    pub fn descriptors(&self) -> &'static [AdapterDescriptor] {
        ADAPTERS
    }

    pub fn is_linked(&self, name: &str) -> bool {
        resolve(name).is_some_and(|d| self.factories.contains_key(d.name))
    }

    /// Builds the adapter selected by `name`; `None` options mean `{}`.
    pub fn create(
        &self,
        name: &str,
        options: Option<AdapterOptions>,
    ) -> Result<Box<dyn Adapter>> {
        let descriptor = resolve(name).ok_or_else(|| AdapterError::UnknownAdapter {
            name: name.to_string(),
        })?;

        let factory =
            self.factories
                .get(descriptor.name)
                .ok_or_else(|| AdapterError::AdapterNotLinked {
                    name: descriptor.name.to_string(),
                    library: descriptor.lib.unwrap_or(descriptor.path).to_string(),
                })?;

        tracing::debug!(
            requested = name,
            adapter = descriptor.name,
            "creating adapter"
        );
        factory(options.unwrap_or_default())
    }
}

impl Default for AdapterRegistry {
    /// Registry with the adapters shipped in this crate.
    fn default() -> Self {
        let mut registry = Self::new();
        registry
            .factories
            .insert("rest", crate::adapters::rest::create_adapter);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_postgres_aliases_share_descriptor() {
        let pg = resolve("pg").unwrap();
        let postgresql = resolve("postgresql").unwrap();
        let postgres = resolve("postgres").unwrap();

        assert_eq!(pg, postgres);
        assert_eq!(postgresql, postgres);
        assert!(std::ptr::eq(pg, postgres));
        assert_eq!(pg.name, "postgres");
        assert_eq!(pg.lib, Some("pg"));
        assert_eq!(pg.storage_type, StorageType::Sql);
    }

    #[test]
    fn test_mongo_alias() {
        assert_eq!(resolve("mongodb").unwrap().name, "mongo");
        assert_eq!(resolve("mongo").unwrap().storage_type, StorageType::Nosql);
    }

    #[test]
    fn test_resolve_is_exact_and_case_sensitive() {
        assert!(resolve("unknown").is_none());
        assert!(resolve("PG").is_none());
        assert!(resolve("postgre").is_none());
        assert!(resolve("rest ").is_none());
        assert!(resolve("").is_none());
    }

    #[test]
    fn test_every_alias_points_at_a_descriptor() {
        for (alias, canonical) in ALIASES {
            assert_eq!(resolve(alias).map(|d| d.name), Some(*canonical));
        }
        assert_eq!(ADAPTERS.len(), 9);
    }

    #[test]
    fn test_create_unknown_adapter_fails() {
        let registry = AdapterRegistry::default();
        match registry.create("unknown", Some(AdapterOptions::new())) {
            Err(AdapterError::UnknownAdapter { name }) => assert_eq!(name, "unknown"),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("unknown adapter should not be created"),
        }
    }

    #[test]
    fn test_create_unlinked_adapter_fails() {
        let registry = AdapterRegistry::default();
        match registry.create("postgresql", None) {
            Err(AdapterError::AdapterNotLinked { name, library }) => {
                assert_eq!(name, "postgres");
                assert_eq!(library, "pg");
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("postgres is not linked into this crate"),
        }
    }

    #[test]
    fn test_create_rest_with_options() {
        let registry = AdapterRegistry::default();
        let options = json!({"host": "http://api.local", "camelize": true});

        let adapter = registry
            .create("rest", options.as_object().cloned())
            .unwrap();

        assert_eq!(adapter.name(), "rest");
        assert!(registry.is_linked("rest"));
        assert!(!registry.is_linked("memory"));
    }

    #[test]
    fn test_register_links_external_backend() {
        fn memory_factory(options: AdapterOptions) -> Result<Box<dyn Adapter>> {
            crate::adapters::rest::create_adapter(options)
        }

        let mut registry = AdapterRegistry::new();
        assert!(!registry.is_linked("memory"));

        registry.register("memory", memory_factory).unwrap();
        assert!(registry.is_linked("memory"));
        assert!(registry.register("redis", memory_factory).is_err());
    }
}
