//! Loaded entity records.

use serde_json::{Map, Value};
use std::collections::HashMap;

/// A loaded relationship value on a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded {
    /// A to-one relation, possibly absent.
    One(Option<Box<Record>>),
    /// A to-many relation.
    Many(Vec<Record>),
    /// The currently associated identifiers of a pivot-backed relation.
    Ids(Vec<i64>),
}

/// A loaded entity: scalar attributes plus whatever relationships the
/// caller chose to load.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    /// Entity type name.
    pub entity: String,
    /// Scalar attribute values keyed by column name.
    pub attributes: Map<String, Value>,
    /// Relationships loaded onto this record, keyed by capability name.
    pub relationships: HashMap<String, Loaded>,
}

impl Record {
    pub fn new(entity: &str) -> Self {
        Self {
            entity: entity.to_string(),
            attributes: Map::new(),
            relationships: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_attr(mut self, name: &str, value: Value) -> Self {
        self.attributes.insert(name.to_string(), value);
        self
    }

    #[must_use]
    pub fn with_loaded(mut self, name: &str, loaded: Loaded) -> Self {
        self.relationships.insert(name.to_string(), loaded);
        self
    }

    /// Read a scalar attribute.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Read the identity value under the given identity column.
    pub fn identity_value(&self, identity: &str) -> Option<i64> {
        self.attributes.get(identity).and_then(Value::as_i64)
    }

    /// Whether the named relationship is currently loaded.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.relationships.contains_key(name)
    }
}
