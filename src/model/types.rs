//! Storage and cast type vocabulary for entity columns.

use serde::{Deserialize, Serialize};

/// Physical storage type of a declared column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    Boolean,
    Integer,
    BigInt,
    SmallInt,
    Decimal,
    Float,
    Date,
    DateTime,
    Timestamp,
    Json,
    Text,
    Varchar,
    Char,
    Enum,
}

impl StorageType {
    /// Whether the stored value is a nested document rather than a scalar.
    pub fn is_structured(self) -> bool {
        matches!(self, StorageType::Json)
    }
}

/// Declared semantic cast of a column.
///
/// `Json`, `Attachment` and `LocalizedText` mark structured columns: dotted
/// sub-paths under them are value-level lookups into the stored document,
/// never relational traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastType {
    Boolean,
    Integer,
    Decimal,
    Date,
    Json,
    Text,
    Attachment,
    LocalizedText,
}

impl CastType {
    /// Whether dotted sub-paths under this cast read inside the stored
    /// value instead of traversing a relationship.
    pub fn is_structured(self) -> bool {
        matches!(
            self,
            CastType::Json | CastType::Attachment | CastType::LocalizedText
        )
    }
}

/// Semantic type reported for a field, derived from the declared cast
/// first and the storage type second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    Boolean,
    Integer,
    Number,
    Date,
    Json,
    Text,
    Attachment {
        /// Plural-named attachment fields hold a collection of files.
        collection: bool,
    },
    LocalizedText,
}
