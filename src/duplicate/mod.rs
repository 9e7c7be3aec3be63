//! Duplication engine: structurally safe cloning of loaded entities.
//!
//! Duplication copies scalar attributes (minus identity and timestamps),
//! renames identifying fields with collision-safe suffixes, and copies the
//! relationships that copy safely: pivot id lists and scalar foreign keys.
//! Owned children are never auto-duplicated, since that would be an
//! unbounded deep copy.

pub mod naming;
pub mod partition;

pub use naming::{counted_copy, unique_name};
pub use partition::{partition_attributes, PartitionedAttributes};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::DuplicationSettings;
use crate::model::{Capability, CastType, EntityType, Loaded, Record, TIMESTAMP_COLUMNS};
use crate::query::{Datastore, RecordId, StoreError};
use crate::schema::SchemaOracle;
use crate::value::decode_localized;

/// Errors surfaced by duplication. Per-capability copy failures are not
/// errors: the capability is excluded and logged.
#[derive(Debug, Error)]
pub enum DuplicateError {
    #[error("{entity} #{id} not found")]
    NotFound { entity: String, id: RecordId },

    #[error("unknown entity type: {0}")]
    UnknownEntity(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type DuplicateResult<T> = Result<T, DuplicateError>;

/// A relationship value captured for duplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CopyValue {
    /// Associated identifiers of a pivot-backed relation.
    IdList(Vec<RecordId>),
    /// Scalar foreign key of an inverse-of-one relation.
    ForeignKey(Value),
}

/// Scalar attributes plus the relationship values to copy onto the new
/// entity. Identity and timestamp columns are excluded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DuplicationPlan {
    pub attributes: Map<String, Value>,
    pub relationships: BTreeMap<String, CopyValue>,
}

/// Duplication engine over one oracle + settings pair.
pub struct DuplicationEngine<'a> {
    oracle: &'a SchemaOracle,
    settings: &'a DuplicationSettings,
}

impl<'a> DuplicationEngine<'a> {
    pub fn new(oracle: &'a SchemaOracle, settings: &'a DuplicationSettings) -> Self {
        Self { oracle, settings }
    }

    /// Duplicate `entity` #`id`, copying the relationships in `requested`
    /// that validate as duplicable. Returns the new record with its
    /// duplicated relationships reloaded.
    pub fn duplicate(
        &self,
        entity: &str,
        id: RecordId,
        requested: &[String],
        store: &mut dyn Datastore,
    ) -> DuplicateResult<Record> {
        let entity_type = self
            .oracle
            .entity(entity)
            .ok_or_else(|| DuplicateError::UnknownEntity(entity.to_string()))?;
        let mut source = store
            .find(entity, id)
            .ok_or_else(|| DuplicateError::NotFound {
                entity: entity.to_string(),
                id,
            })?;

        let valid = self.validate_relationships(entity_type, requested);
        if !valid.is_empty() {
            store.load_relationships(&mut source, &valid)?;
        }

        let plan = self.plan(entity_type, &source);
        self.execute(entity_type, &plan, store)
    }

    /// Filter the requested capability names down to those that may take
    /// part in duplication: declared on the entity type and not a
    /// target-less polymorphic inverse.
    pub fn validate_relationships(&self, entity: &EntityType, requested: &[String]) -> Vec<String> {
        requested
            .iter()
            .filter(|name| match self.oracle.capability(entity, name) {
                Some(Capability::PolymorphicInverse) => {
                    tracing::warn!(
                        "excluding target-less polymorphic inverse {} on {}",
                        name,
                        entity.name
                    );
                    false
                }
                Some(_) => true,
                None => {
                    tracing::warn!(
                        "excluding undeclared relationship {} on {}",
                        name,
                        entity.name
                    );
                    false
                }
            })
            .cloned()
            .collect()
    }

    /// Compute the duplication plan: transformed scalar attributes plus
    /// the loaded relationship values that copy safely.
    pub fn plan(&self, entity: &EntityType, source: &Record) -> DuplicationPlan {
        let mut attributes = source.attributes.clone();
        attributes.remove(&entity.identity);
        for column in TIMESTAMP_COLUMNS {
            attributes.remove(*column);
        }

        for field in &self.settings.slug_fields {
            if let Some(value) = attributes.get(field).cloned() {
                let renamed = self.suffixed(entity, field, &value, Some(&self.settings.slug_suffix));
                attributes.insert(field.clone(), renamed);
            }
        }
        for field in &self.settings.title_fields {
            if let Some(value) = attributes.get(field).cloned() {
                let renamed = self.suffixed(entity, field, &value, None);
                attributes.insert(field.clone(), renamed);
            }
        }

        let mut relationships = BTreeMap::new();
        for (name, loaded) in &source.relationships {
            let Some(capability) = entity.capability(name) else {
                continue;
            };
            if !capability.is_duplicable() {
                tracing::debug!(
                    "relationship {} ({}) is not auto-duplicated",
                    name,
                    capability.kind()
                );
                continue;
            }
            if let Some(value) = self.capture(capability, name, loaded, source) {
                relationships.insert(name.clone(), value);
            }
        }

        DuplicationPlan {
            attributes,
            relationships,
        }
    }

    /// Capture the copyable value of one loaded relationship, or nothing
    /// for capability kinds that are excluded from duplication.
    fn capture(
        &self,
        capability: &Capability,
        name: &str,
        loaded: &Loaded,
        source: &Record,
    ) -> Option<CopyValue> {
        match (capability, loaded) {
            (Capability::ToManyThroughPivot { .. }, Loaded::Ids(ids)) => {
                Some(CopyValue::IdList(ids.clone()))
            }
            (Capability::ToManyThroughPivot { .. }, Loaded::Many(records)) => {
                let identity = self
                    .oracle
                    .related_entity(capability)
                    .map_or(crate::model::IDENTITY_COLUMN, |e| e.identity.as_str());
                let mut ids = Vec::with_capacity(records.len());
                for record in records {
                    match record.identity_value(identity) {
                        Some(id) => ids.push(id),
                        None => {
                            tracing::warn!(
                                "excluding {}: a related record has no identity",
                                name
                            );
                            return None;
                        }
                    }
                }
                Some(CopyValue::IdList(ids))
            }
            (Capability::ToOneInverse { foreign_key, .. }, _) => source
                .get(foreign_key)
                .filter(|value| !value.is_null())
                .map(|value| CopyValue::ForeignKey(value.clone())),
            // A pivot relation loaded in an unexpected shape.
            _ => None,
        }
    }

    /// Create the new entity and copy the planned relationships. A failing
    /// relationship copy excludes that capability, never the whole
    /// duplication.
    pub fn execute(
        &self,
        entity: &EntityType,
        plan: &DuplicationPlan,
        store: &mut dyn Datastore,
    ) -> DuplicateResult<Record> {
        let mut created = store.create(&entity.name, plan.attributes.clone())?;
        let Some(id) = created.identity_value(&entity.identity) else {
            tracing::warn!(
                "created {} has no identity; skipping relationship copy",
                entity.name
            );
            return Ok(created);
        };

        let mut copied = Vec::new();
        for (name, value) in &plan.relationships {
            let outcome = match value {
                CopyValue::IdList(ids) => store.sync_associations(&entity.name, id, name, ids),
                CopyValue::ForeignKey(fk) => {
                    let Some(Capability::ToOneInverse { foreign_key, .. }) =
                        entity.capability(name)
                    else {
                        continue;
                    };
                    let mut attributes = Map::new();
                    attributes.insert(foreign_key.clone(), fk.clone());
                    store.update(&entity.name, id, attributes)
                }
            };
            match outcome {
                Ok(()) => copied.push(name.clone()),
                Err(error) => {
                    tracing::warn!(
                        "failed to copy relationship {} on {}: {}",
                        name,
                        entity.name,
                        error
                    );
                }
            }
        }

        if !copied.is_empty() {
            store.load_relationships(&mut created, &copied)?;
        }
        Ok(created)
    }

    /// Apply the copy-suffix rule to one identifying field: per locale for
    /// localized values, on the scalar string otherwise.
    fn suffixed(
        &self,
        entity: &EntityType,
        field: &str,
        value: &Value,
        fixed: Option<&str>,
    ) -> Value {
        let localized = matches!(
            self.oracle.cast_type(entity, field),
            Some(CastType::LocalizedText)
        );
        if localized {
            if let Some(map) = decode_localized(value) {
                return Value::Object(self.suffix_map(map, fixed));
            }
        }
        match value {
            Value::String(text) => Value::String(self.apply_suffix(text, None, fixed)),
            // A localized-shaped value without the declared cast still
            // suffixes per key.
            Value::Object(map) => Value::Object(self.suffix_map(map.clone(), fixed)),
            other => other.clone(),
        }
    }

    fn suffix_map(&self, map: Map<String, Value>, fixed: Option<&str>) -> Map<String, Value> {
        let mut out = Map::new();
        for (locale, entry) in map {
            let renamed = match &entry {
                Value::String(text) => {
                    Value::String(self.apply_suffix(text, Some(locale.as_str()), fixed))
                }
                _ => entry.clone(),
            };
            out.insert(locale, renamed);
        }
        out
    }

    fn apply_suffix(&self, text: &str, locale: Option<&str>, fixed: Option<&str>) -> String {
        match fixed {
            Some(suffix) => format!("{text}{suffix}"),
            None => naming::counted_copy(text, self.settings.copy_text(locale)),
        }
    }
}
