//! In-memory datastore used by the duplication tests and examples.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};

use super::{Datastore, RecordId, StoreError};
use crate::model::{Capability, Loaded, Record, SchemaRegistry, IDENTITY_COLUMN};

/// A toy datastore: one keyed table per entity type plus pivot id sets.
///
/// Only the surface the duplication engine drives is implemented; read
/// compilation is exercised against [`RecordingQuery`](super::RecordingQuery)
/// instead.
#[derive(Debug)]
pub struct MemoryStore {
    registry: SchemaRegistry,
    rows: HashMap<String, BTreeMap<RecordId, Map<String, Value>>>,
    pivots: HashMap<(String, RecordId, String), Vec<RecordId>>,
    next_id: RecordId,
}

impl MemoryStore {
    pub fn new(registry: SchemaRegistry) -> Self {
        Self {
            registry,
            rows: HashMap::new(),
            pivots: HashMap::new(),
            next_id: 1,
        }
    }

    fn identity_of(&self, entity: &str) -> &str {
        self.registry
            .get(entity)
            .map_or(IDENTITY_COLUMN, |e| e.identity.as_str())
    }

    /// Insert a row, honoring an identity value already present in the
    /// attributes, and return its id.
    pub fn seed(&mut self, entity: &str, mut attributes: Map<String, Value>) -> RecordId {
        let identity = self.identity_of(entity).to_string();
        let id = attributes
            .get(&identity)
            .and_then(Value::as_i64)
            .unwrap_or(self.next_id);
        self.next_id = self.next_id.max(id + 1);
        attributes.insert(identity, Value::from(id));
        self.rows
            .entry(entity.to_string())
            .or_default()
            .insert(id, attributes);
        id
    }

    /// Seed a pivot association set.
    pub fn attach(&mut self, entity: &str, id: RecordId, capability: &str, ids: Vec<RecordId>) {
        self.pivots
            .insert((entity.to_string(), id, capability.to_string()), ids);
    }

    /// Read a raw stored row.
    pub fn row(&self, entity: &str, id: RecordId) -> Option<&Map<String, Value>> {
        self.rows.get(entity).and_then(|table| table.get(&id))
    }

    /// Read a pivot association set.
    pub fn associations(&self, entity: &str, id: RecordId, capability: &str) -> Vec<RecordId> {
        self.pivots
            .get(&(entity.to_string(), id, capability.to_string()))
            .cloned()
            .unwrap_or_default()
    }
}

impl Datastore for MemoryStore {
    fn find(&self, entity: &str, id: RecordId) -> Option<Record> {
        let attributes = self.row(entity, id)?.clone();
        Some(Record {
            entity: entity.to_string(),
            attributes,
            relationships: HashMap::new(),
        })
    }

    fn create(
        &mut self,
        entity: &str,
        mut attributes: Map<String, Value>,
    ) -> Result<Record, StoreError> {
        let identity = self.identity_of(entity).to_string();
        let id = self.next_id;
        self.next_id += 1;
        attributes.insert(identity, Value::from(id));
        self.rows
            .entry(entity.to_string())
            .or_default()
            .insert(id, attributes.clone());
        Ok(Record {
            entity: entity.to_string(),
            attributes,
            relationships: HashMap::new(),
        })
    }

    fn update(
        &mut self,
        entity: &str,
        id: RecordId,
        attributes: Map<String, Value>,
    ) -> Result<(), StoreError> {
        let row = self
            .rows
            .get_mut(entity)
            .and_then(|table| table.get_mut(&id))
            .ok_or_else(|| StoreError::NotFound {
                entity: entity.to_string(),
                id,
            })?;
        for (key, value) in attributes {
            row.insert(key, value);
        }
        Ok(())
    }

    fn sync_associations(
        &mut self,
        entity: &str,
        id: RecordId,
        capability: &str,
        ids: &[RecordId],
    ) -> Result<(), StoreError> {
        if self.row(entity, id).is_none() {
            return Err(StoreError::NotFound {
                entity: entity.to_string(),
                id,
            });
        }
        self.pivots.insert(
            (entity.to_string(), id, capability.to_string()),
            ids.to_vec(),
        );
        Ok(())
    }

    fn load_relationships(
        &mut self,
        record: &mut Record,
        names: &[String],
    ) -> Result<(), StoreError> {
        let Some(entity) = self.registry.get(&record.entity) else {
            return Ok(());
        };
        let Some(id) = record.identity_value(&entity.identity) else {
            return Ok(());
        };
        for name in names {
            match entity.capability(name) {
                Some(Capability::ToManyThroughPivot { .. }) => {
                    let ids = self.associations(&record.entity, id, name);
                    record
                        .relationships
                        .insert(name.clone(), Loaded::Ids(ids));
                }
                Some(Capability::ToOneInverse {
                    related,
                    foreign_key,
                }) => {
                    let related_id = record.get(foreign_key).and_then(Value::as_i64);
                    let loaded = related_id.and_then(|rid| self.find(related, rid));
                    record
                        .relationships
                        .insert(name.clone(), Loaded::One(loaded.map(Box::new)));
                }
                // Owned and polymorphic relations are not materialized here.
                Some(_) | None => {}
            }
        }
        Ok(())
    }
}
