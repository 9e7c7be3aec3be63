//! Projection compiler: field specifications to columns and eager-load
//! plans.
//!
//! A field specification is a comma-separated list of dotted paths, e.g.
//! `"id,title,property.color,tags.name"`. Each path's head segment is
//! classified by the schema oracle:
//!
//! - a structured (JSON-cast) column keeps only the head as a column; the
//!   remainder is a value-level lookup performed after load
//! - a relationship capability recurses the remainder against the related
//!   entity type, unioning columns across repeated mentions of the same
//!   head
//! - a plain column is selected directly
//! - anything else is dropped silently (tolerant DSL)
//!
//! An empty column set means "no restriction". Whenever an explicit
//! restriction exists, the identity column is unioned in so downstream
//! relationship loads always have keys to join on.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::{EntityType, IDENTITY_COLUMN};
use crate::query::QueryBuilder;
use crate::schema::{Classified, SchemaOracle};

/// Columns and nested relationship loads compiled for one entity type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectionPlan {
    /// Columns to select; empty means no restriction.
    pub columns: BTreeSet<String>,
    /// Relationship entries keyed by capability name.
    pub relationships: BTreeMap<String, RelationProjection>,
}

/// The portion of a plan scoped to one relationship entry. An empty
/// column set projects the related entity in full.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RelationProjection {
    pub columns: BTreeSet<String>,
    pub nested: BTreeMap<String, RelationProjection>,
}

impl ProjectionPlan {
    /// Whether the plan restricts nothing at all.
    pub fn is_unrestricted(&self) -> bool {
        self.columns.is_empty() && self.relationships.is_empty()
    }
}

/// Compiles field specifications into [`ProjectionPlan`]s and applies
/// them to a query.
pub struct ProjectionCompiler<'a> {
    oracle: &'a SchemaOracle,
}

impl<'a> ProjectionCompiler<'a> {
    pub fn new(oracle: &'a SchemaOracle) -> Self {
        Self { oracle }
    }

    /// Compile a field specification against an entity type.
    ///
    /// With no entity context the oracle cannot classify, and every raw
    /// path is kept verbatim as a column (decoupled/ad-hoc usage).
    pub fn compile(&self, spec: Option<&str>, entity: Option<&EntityType>) -> ProjectionPlan {
        let mut plan = ProjectionPlan::default();
        let Some(spec) = spec else { return plan };

        for raw in spec.split(',') {
            let field = raw.trim();
            if field.is_empty() {
                continue;
            }
            match entity {
                Some(entity) => {
                    let segments: Vec<&str> = field.split('.').collect();
                    self.compile_path(
                        &mut plan.columns,
                        &mut plan.relationships,
                        entity,
                        &segments,
                    );
                }
                None => {
                    plan.columns.insert(field.to_string());
                }
            }
        }

        if !plan.columns.is_empty() {
            let identity = entity.map_or(IDENTITY_COLUMN, |e| e.identity.as_str());
            plan.columns.insert(identity.to_string());
        }
        plan
    }

    fn compile_path(
        &self,
        columns: &mut BTreeSet<String>,
        relationships: &mut BTreeMap<String, RelationProjection>,
        entity: &EntityType,
        segments: &[&str],
    ) {
        let head = segments[0];
        match self.oracle.classify(entity, head) {
            // The remainder of the path is a value-level lookup inside the
            // stored document; only the base column is fetched.
            Classified::JsonColumn => {
                columns.insert(head.to_string());
            }
            Classified::Column if segments.len() == 1 => {
                columns.insert(head.to_string());
            }
            // A dotted path under a scalar column goes nowhere.
            Classified::Column => {}
            Classified::Capability => {
                let entry = relationships.entry(head.to_string()).or_default();
                if segments.len() == 1 {
                    // Bare mention: project the related entity in full.
                    return;
                }
                let related = entity
                    .capability(head)
                    .and_then(|c| self.oracle.related_entity(c));
                match related {
                    Some(related) => {
                        self.compile_path(
                            &mut entry.columns,
                            &mut entry.nested,
                            related,
                            &segments[1..],
                        );
                        if !entry.columns.is_empty() {
                            entry.columns.insert(related.identity.clone());
                        }
                    }
                    None => {
                        // Related type not registered: keep the remainder
                        // verbatim, as in the no-schema fallback.
                        entry.columns.insert(segments[1..].join("."));
                        entry.columns.insert(IDENTITY_COLUMN.to_string());
                    }
                }
            }
            Classified::Unknown => {}
        }
    }

    /// Apply a compiled plan to a query: column selection plus a nested
    /// scoped loader per relationship entry. Every nested loader selects
    /// the related identity column alongside the requested columns.
    pub fn apply(
        &self,
        plan: &ProjectionPlan,
        entity: Option<&EntityType>,
        query: &mut dyn QueryBuilder,
    ) {
        if !plan.columns.is_empty() {
            let columns: Vec<String> = plan.columns.iter().cloned().collect();
            query.select_columns(&columns);
        }
        for (name, relation) in &plan.relationships {
            let related = entity
                .and_then(|e| e.capability(name))
                .and_then(|c| self.oracle.related_entity(c));
            self.apply_relation(relation, related, name, query);
        }
    }

    fn apply_relation(
        &self,
        relation: &RelationProjection,
        related: Option<&EntityType>,
        name: &str,
        query: &mut dyn QueryBuilder,
    ) {
        query.with_relationship(name, &mut |scoped| {
            if !relation.columns.is_empty() {
                let identity = related.map_or(IDENTITY_COLUMN, |e| e.identity.as_str());
                let mut columns = relation.columns.clone();
                columns.insert(identity.to_string());
                let columns: Vec<String> = columns.into_iter().collect();
                scoped.select_columns(&columns);
            }
            for (nested_name, nested) in &relation.nested {
                let next = related
                    .and_then(|e| e.capability(nested_name))
                    .and_then(|c| self.oracle.related_entity(c));
                self.apply_relation(nested, next, nested_name, scoped);
            }
        });
    }
}
