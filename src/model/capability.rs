//! Relationship capabilities declared on entity types.

use serde::{Deserialize, Serialize};

/// A named relationship accessor declared on an entity type.
///
/// Capabilities are declared up front in the schema registry, so deciding
/// whether a name is a relationship is a map lookup, never a speculative
/// call that might fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Capability {
    /// Owned one-to-one.
    ToOne { related: String },
    /// Foreign-key side of a to-one: the related row owns this one.
    ToOneInverse { related: String, foreign_key: String },
    /// Owned one-to-many.
    ToMany { related: String },
    /// Many-to-many through a pivot table.
    ToManyThroughPivot { related: String, pivot: String },
    /// Polymorphic owned one-to-one.
    PolymorphicToOne { related: String },
    /// Polymorphic owned one-to-many.
    PolymorphicToMany { related: String },
    /// Target-less polymorphic inverse; the related type is only known per
    /// row, so no static traversal is possible.
    PolymorphicInverse,
}

impl Capability {
    /// The related entity type, when it is known statically.
    pub fn related(&self) -> Option<&str> {
        match self {
            Capability::ToOne { related }
            | Capability::ToOneInverse { related, .. }
            | Capability::ToMany { related }
            | Capability::ToManyThroughPivot { related, .. }
            | Capability::PolymorphicToOne { related }
            | Capability::PolymorphicToMany { related } => Some(related),
            Capability::PolymorphicInverse => None,
        }
    }

    /// Whether duplication may copy this relationship. Pivot id lists and
    /// scalar foreign keys copy safely; owned children would require an
    /// unbounded deep copy and are excluded.
    pub fn is_duplicable(&self) -> bool {
        matches!(
            self,
            Capability::ToManyThroughPivot { .. } | Capability::ToOneInverse { .. }
        )
    }

    /// Short tag used in log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Capability::ToOne { .. } => "to_one",
            Capability::ToOneInverse { .. } => "to_one_inverse",
            Capability::ToMany { .. } => "to_many",
            Capability::ToManyThroughPivot { .. } => "to_many_through_pivot",
            Capability::PolymorphicToOne { .. } => "polymorphic_to_one",
            Capability::PolymorphicToMany { .. } => "polymorphic_to_many",
            Capability::PolymorphicInverse => "polymorphic_inverse",
        }
    }
}
