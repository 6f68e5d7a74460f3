//! Schema registry describing the known data sources.
//!
//! The registry maps each source to its exposed collections and each
//! collection to its ordered field names. It is loaded once at startup and
//! shared read-only for the lifetime of the process.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// A collection (entity set) exposed by a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSchema {
    /// Collection name.
    pub name: String,
    /// Field names in declaration order.
    #[serde(default)]
    pub fields: Vec<String>,
}

impl CollectionSchema {
    /// Create a collection with the given fields.
    pub fn new<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// A data source and the collections it exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSchema {
    /// Source name.
    pub name: String,
    /// Collections in declaration order.
    #[serde(default)]
    pub collections: Vec<CollectionSchema>,
}

impl SourceSchema {
    /// Create a source with no collections.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collections: Vec::new(),
        }
    }

    /// Add a collection.
    pub fn with_collection<I, S>(mut self, name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.collections.push(CollectionSchema::new(name, fields));
        self
    }

    /// Collection names in declaration order.
    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.collections.iter().map(|c| c.name.as_str())
    }

    /// Look up a collection by name.
    pub fn collection(&self, name: &str) -> Option<&CollectionSchema> {
        self.collections.iter().find(|c| c.name == name)
    }

    /// Field names of a collection.
    pub fn fields(&self, collection: &str) -> Option<&[String]> {
        self.collection(collection).map(|c| c.fields.as_slice())
    }
}

/// Read-only registry of source schemas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRegistry {
    #[serde(default)]
    sources: Vec<SourceSchema>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source.
    pub fn with_source(mut self, source: SourceSchema) -> Self {
        self.sources.push(source);
        self
    }

    /// Parse a registry from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self, RegistryError> {
        let registry: Self = serde_json::from_str(json)?;
        registry.check_unique()?;
        Ok(registry)
    }

    /// Load a registry from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    fn check_unique(&self) -> Result<(), RegistryError> {
        for (i, source) in self.sources.iter().enumerate() {
            if self.sources[..i].iter().any(|s| s.name == source.name) {
                return Err(RegistryError::DuplicateSource(source.name.clone()));
            }
        }
        Ok(())
    }

    /// Source names in load order.
    pub fn list_sources(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name.as_str()).collect()
    }

    /// Describe a source's collections and their fields.
    pub fn describe(&self, source: &str) -> Option<&SourceSchema> {
        self.sources.iter().find(|s| s.name == source)
    }

    /// Iterate over all sources.
    pub fn sources(&self) -> impl Iterator<Item = &SourceSchema> {
        self.sources.iter()
    }

    /// Whether `source` exposes `collection`.
    pub fn contains(&self, source: &str, collection: &str) -> bool {
        self.describe(source)
            .and_then(|s| s.collection(collection))
            .is_some()
    }

    /// Number of sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Check if the registry has no sources.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
