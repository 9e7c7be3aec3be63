//! Entity schema model: columns, casts, capabilities, and the startup
//! registry.

pub mod capability;
pub mod record;
pub mod types;

pub use capability::Capability;
pub use record::{Loaded, Record};
pub use types::{CastType, SemanticType, StorageType};

use inflector::Inflector;
use std::collections::HashMap;

/// Default identity column name.
pub const IDENTITY_COLUMN: &str = "id";

/// Bookkeeping columns excluded from duplication alongside the identity
/// column.
pub const TIMESTAMP_COLUMNS: &[&str] = &["created_at", "updated_at", "deleted_at"];

/// A persisted record kind with a fixed column/relationship/cast schema.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityType {
    /// Entity name, e.g. `Post`.
    pub name: String,
    /// Backing table identifier.
    pub table: String,
    /// Identity column.
    pub identity: String,
    /// Declared columns keyed by name.
    pub columns: HashMap<String, Column>,
    /// Declared semantic casts keyed by column name.
    pub casts: HashMap<String, CastType>,
    /// Declared relationship capabilities keyed by accessor name.
    pub capabilities: HashMap<String, Capability>,
}

/// A declared column with its storage type.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub storage: StorageType,
}

impl EntityType {
    /// Create an entity type. The table identifier defaults to the
    /// pluralized snake-case form of the name (`Post` → `posts`).
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            table: name.to_table_case(),
            identity: IDENTITY_COLUMN.to_string(),
            columns: HashMap::new(),
            casts: HashMap::new(),
            capabilities: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_table(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    #[must_use]
    pub fn with_identity(mut self, column: &str) -> Self {
        self.identity = column.to_string();
        self
    }

    #[must_use]
    pub fn with_column(mut self, name: &str, storage: StorageType) -> Self {
        self.columns.insert(
            name.to_string(),
            Column {
                name: name.to_string(),
                storage,
            },
        );
        self
    }

    #[must_use]
    pub fn with_cast(mut self, name: &str, cast: CastType) -> Self {
        self.casts.insert(name.to_string(), cast);
        self
    }

    #[must_use]
    pub fn with_capability(mut self, name: &str, capability: Capability) -> Self {
        self.capabilities.insert(name.to_string(), capability);
        self
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn capability(&self, name: &str) -> Option<&Capability> {
        self.capabilities.get(name)
    }
}

/// All entity types known at startup, keyed by entity name.
///
/// The registry is built once at deploy time and injected wherever schema
/// questions are asked; nothing mutates it afterwards.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entities: HashMap<String, EntityType>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entity: EntityType) {
        self.entities.insert(entity.name.clone(), entity);
    }

    #[must_use]
    pub fn with_entity(mut self, entity: EntityType) -> Self {
        self.register(entity);
        self
    }

    pub fn get(&self, name: &str) -> Option<&EntityType> {
        self.entities.get(name)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
