//! The query-construction seam between the compilers and the storage
//! layer.
//!
//! The compilers never talk to a database. Read compilation drives an
//! object-safe [`QueryBuilder`] supplied by the storage layer; the
//! duplication engine additionally drives a [`Datastore`] for its write
//! and reload steps. In-crate implementations ([`RecordingQuery`],
//! [`MemoryStore`]) exist for tests and previews.

pub mod memory;
pub mod recording;

pub use memory::MemoryStore;
pub use recording::{RecordedOp, RecordingQuery};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::Record;

/// Identifier type for persisted records.
pub type RecordId = i64;

/// Comparison operators applied to a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    Ne,
    Like,
    NotLike,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
    Between,
    IsNull,
    IsNotNull,
}

impl Operator {
    /// Parse a wire operator key (`_eq`, `_like`, ...).
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "_eq" => Some(Operator::Eq),
            "_ne" => Some(Operator::Ne),
            "_like" => Some(Operator::Like),
            "_not_like" => Some(Operator::NotLike),
            "_gt" => Some(Operator::Gt),
            "_gte" => Some(Operator::Gte),
            "_lt" => Some(Operator::Lt),
            "_lte" => Some(Operator::Lte),
            "_in" => Some(Operator::In),
            "_not_in" => Some(Operator::NotIn),
            "_between" => Some(Operator::Between),
            "_is_null" => Some(Operator::IsNull),
            "_is_not_null" => Some(Operator::IsNotNull),
            _ => None,
        }
    }

    /// Whether the operator is meaningless without a comparison value.
    /// The null tests act on a flag instead.
    pub fn requires_value(self) -> bool {
        !matches!(self, Operator::IsNull | Operator::IsNotNull)
    }

    /// Textual form used by renderers and log messages.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Like => "like",
            Operator::NotLike => "not like",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::In => "in",
            Operator::NotIn => "not in",
            Operator::Between => "between",
            Operator::IsNull => "is null",
            Operator::IsNotNull => "is not null",
        }
    }
}

/// Scope callback used for nested relationship loaders and existential
/// constraints.
pub type Scope<'a> = &'a mut dyn FnMut(&mut dyn QueryBuilder);

/// Query-construction interface supplied by the storage layer.
pub trait QueryBuilder {
    /// Restrict the selected columns.
    fn select_columns(&mut self, columns: &[String]);

    /// Register a relationship to eager-load, scoped by `scope`.
    fn with_relationship(&mut self, name: &str, scope: Scope<'_>);

    /// Apply a column predicate.
    fn where_condition(&mut self, column: &str, op: Operator, value: &Value);

    /// Constrain to rows with at least one related row matching `scope`.
    fn where_relationship_exists(&mut self, name: &str, scope: Scope<'_>);
}

/// Errors surfaced by a [`Datastore`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("{entity} #{id} not found")]
    NotFound { entity: String, id: RecordId },

    #[error("storage fault: {0}")]
    Backend(String),
}

/// Write and reload surface driven by the duplication engine.
pub trait Datastore {
    /// Fetch one record by identity.
    fn find(&self, entity: &str, id: RecordId) -> Option<Record>;

    /// Persist a new record and return it with its identity assigned.
    fn create(&mut self, entity: &str, attributes: Map<String, Value>)
        -> Result<Record, StoreError>;

    /// Merge attribute updates into an existing record.
    fn update(
        &mut self,
        entity: &str,
        id: RecordId,
        attributes: Map<String, Value>,
    ) -> Result<(), StoreError>;

    /// Replace the associated identifier set of a pivot-backed relation.
    fn sync_associations(
        &mut self,
        entity: &str,
        id: RecordId,
        capability: &str,
        ids: &[RecordId],
    ) -> Result<(), StoreError>;

    /// Load the named relationships onto `record`.
    fn load_relationships(
        &mut self,
        record: &mut Record,
        names: &[String],
    ) -> Result<(), StoreError>;
}
