//! Schema oracle: answers structural questions about entity types.
//!
//! The oracle wraps an injected, read-only [`SchemaRegistry`] and decides
//! how field names resolve against an entity type: plain column,
//! structured (JSON-cast) column, relationship capability, or unknown.
//! All operations are pure and safe to call speculatively.
//!
//! The schema is fixed at deploy time, so classification of a given
//! (entity, field) pair is referentially stable for the process lifetime
//! and results are memoized in a concurrent cache shared across callers.

use dashmap::DashMap;
use inflector::Inflector;

use crate::model::{
    Capability, CastType, EntityType, SchemaRegistry, SemanticType, StorageType,
};

/// How the head segment of a field path resolves against an entity type.
///
/// Resolution priority is fixed: structured cast, then capability, then
/// plain column, then unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classified {
    /// A column carrying a structured cast; deeper path segments are
    /// value-level lookups into the stored document.
    JsonColumn,
    /// A declared relationship capability; deeper path segments recurse
    /// into the related entity type.
    Capability,
    /// A plain declared column.
    Column,
    /// Not declared at all; tolerant callers drop these silently.
    Unknown,
}

/// Oracle over an injected, read-only schema registry.
#[derive(Debug)]
pub struct SchemaOracle {
    registry: SchemaRegistry,
    classifications: DashMap<(String, String), Classified>,
}

impl SchemaOracle {
    pub fn new(registry: SchemaRegistry) -> Self {
        Self {
            registry,
            classifications: DashMap::new(),
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Look up an entity type by name.
    pub fn entity(&self, name: &str) -> Option<&EntityType> {
        self.registry.get(name)
    }

    /// Resolve the entity type a capability points at, when it is known
    /// statically and registered.
    pub fn related_entity(&self, capability: &Capability) -> Option<&EntityType> {
        capability.related().and_then(|name| self.registry.get(name))
    }

    /// Whether `name` is a declared column.
    pub fn is_column(&self, entity: &EntityType, name: &str) -> bool {
        entity.columns.contains_key(name)
    }

    /// The storage type of a declared column.
    pub fn storage_type(&self, entity: &EntityType, name: &str) -> Option<StorageType> {
        entity.columns.get(name).map(|column| column.storage)
    }

    /// The declared semantic cast of a column, if any.
    pub fn cast_type(&self, entity: &EntityType, name: &str) -> Option<CastType> {
        entity.casts.get(name).copied()
    }

    /// Whether `name` is a declared column carrying a structured cast.
    pub fn is_json_column(&self, entity: &EntityType, name: &str) -> bool {
        self.is_column(entity, name)
            && self
                .cast_type(entity, name)
                .is_some_and(CastType::is_structured)
    }

    /// The declared relationship capability under `name`. An undeclared
    /// name is "not a capability", never an error.
    pub fn capability<'a>(&self, entity: &'a EntityType, name: &str) -> Option<&'a Capability> {
        entity.capabilities.get(name)
    }

    /// Classify the head segment of a field path. Memoized per
    /// (entity, field) pair.
    pub fn classify(&self, entity: &EntityType, name: &str) -> Classified {
        let key = (entity.name.clone(), name.to_string());
        if let Some(cached) = self.classifications.get(&key) {
            return *cached;
        }
        let classified = if self.is_json_column(entity, name) {
            Classified::JsonColumn
        } else if entity.capabilities.contains_key(name) {
            Classified::Capability
        } else if self.is_column(entity, name) {
            Classified::Column
        } else {
            Classified::Unknown
        };
        self.classifications.insert(key, classified);
        classified
    }

    /// The semantic type of a field: the declared cast wins, then the
    /// storage type of the column, then nothing.
    pub fn semantic_type(&self, entity: &EntityType, name: &str) -> Option<SemanticType> {
        if let Some(cast) = self.cast_type(entity, name) {
            return Some(match cast {
                CastType::Boolean => SemanticType::Boolean,
                CastType::Integer => SemanticType::Integer,
                CastType::Decimal => SemanticType::Number,
                CastType::Date => SemanticType::Date,
                CastType::Json => SemanticType::Json,
                CastType::Text => SemanticType::Text,
                CastType::Attachment => SemanticType::Attachment {
                    // Plural-named fields hold many files.
                    collection: name.to_singular() != name,
                },
                CastType::LocalizedText => SemanticType::LocalizedText,
            });
        }
        self.storage_type(entity, name).map(|storage| match storage {
            StorageType::Boolean => SemanticType::Boolean,
            StorageType::Integer | StorageType::BigInt | StorageType::SmallInt => {
                SemanticType::Integer
            }
            StorageType::Decimal | StorageType::Float => SemanticType::Number,
            StorageType::Date | StorageType::DateTime | StorageType::Timestamp => {
                SemanticType::Date
            }
            StorageType::Json => SemanticType::Json,
            StorageType::Text | StorageType::Varchar | StorageType::Char | StorageType::Enum => {
                SemanticType::Text
            }
        })
    }
}
