//! Attribute partitioning for incoming write payloads.

use serde_json::{Map, Value};

use crate::model::EntityType;
use crate::schema::{Classified, SchemaOracle};

/// An incoming payload split into scalar column data and relationship
/// values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PartitionedAttributes {
    pub data: Map<String, Value>,
    pub relationships: Map<String, Value>,
}

/// Split `attributes` using the schema: declared columns and cast columns
/// stay in `data`, declared capabilities move to `relationships`, and
/// unknown keys stay in `data` untouched for the storage layer to judge.
pub fn partition_attributes(
    oracle: &SchemaOracle,
    entity: &EntityType,
    attributes: Map<String, Value>,
) -> PartitionedAttributes {
    let mut out = PartitionedAttributes::default();
    for (key, value) in attributes {
        // A column or casted column wins over a capability of the same name.
        if oracle.is_column(entity, &key) || oracle.cast_type(entity, &key).is_some() {
            out.data.insert(key, value);
        } else if matches!(oracle.classify(entity, &key), Classified::Capability) {
            out.relationships.insert(key, value);
        } else {
            out.data.insert(key, value);
        }
    }
    out
}
