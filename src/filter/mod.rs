//! Predicate compiler: declarative filter trees to query predicates.
//!
//! Callers send filters as a nested map:
//!
//! ```json
//! { "_and": { "status": { "_eq": "published" },
//!             "tags.name": { "_like": "sale" } } }
//! ```
//!
//! Everything is applied as a single conjunction. Dotted field paths
//! traverse relationships as existential constraints ("at least one
//! related row matches"). The DSL is tolerant: conditions referencing
//! unknown fields are dropped, and malformed operator values skip the
//! single condition rather than failing the query.

use serde_json::Value;

use crate::model::EntityType;
use crate::query::{Operator, QueryBuilder};
use crate::schema::{Classified, SchemaOracle};
use crate::value::{is_truthy, scalar_to_string};

/// Key introducing the conjunction group on the wire.
const AND_GROUP: &str = "_and";

/// A single declarative filter condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub op: Operator,
    pub value: Value,
}

/// A conjunction of conditions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterExpression {
    pub conditions: Vec<Condition>,
}

impl FilterExpression {
    /// Tolerantly parse the wire shape. Anything that is not an `_and`
    /// group of field → operator-map entries is ignored; unrecognized
    /// operator keys fall back to equality.
    pub fn from_value(filters: &Value) -> Self {
        let mut conditions = Vec::new();
        if let Some(group) = filters.get(AND_GROUP).and_then(Value::as_object) {
            for (field, operators) in group {
                let Some(operators) = operators.as_object() else {
                    continue;
                };
                for (key, value) in operators {
                    let op = Operator::from_key(key).unwrap_or(Operator::Eq);
                    conditions.push(Condition {
                        field: field.clone(),
                        op,
                        value: value.clone(),
                    });
                }
            }
        }
        FilterExpression { conditions }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Applies filter expressions to a query as a single conjunction.
pub struct PredicateCompiler<'a> {
    oracle: &'a SchemaOracle,
}

impl<'a> PredicateCompiler<'a> {
    pub fn new(oracle: &'a SchemaOracle) -> Self {
        Self { oracle }
    }

    pub fn apply(
        &self,
        expr: &FilterExpression,
        entity: Option<&EntityType>,
        query: &mut dyn QueryBuilder,
    ) {
        for condition in &expr.conditions {
            self.apply_condition(entity, condition, query);
        }
    }

    fn apply_condition(
        &self,
        entity: Option<&EntityType>,
        condition: &Condition,
        query: &mut dyn QueryBuilder,
    ) {
        let Condition { field, op, value } = condition;

        if op.requires_value() && (value.is_null() || value.as_str().is_some_and(str::is_empty)) {
            return;
        }

        let segments: Vec<&str> = field.split('.').collect();
        if !self.path_is_known(entity, &segments) {
            if let Some(entity) = entity {
                tracing::debug!("dropping filter on unknown field {}.{}", entity.name, field);
            }
            return;
        }

        if segments.len() > 1 {
            self.apply_traversal(entity, &segments, *op, value, query);
        } else {
            Self::apply_column(field, *op, value, query);
        }
    }

    /// Validate a field path before emitting anything: every intermediate
    /// segment must be a declared capability and the final segment a
    /// column. Levels whose entity type is not registered cannot be
    /// checked and are tolerated.
    fn path_is_known(&self, mut entity: Option<&'a EntityType>, segments: &[&str]) -> bool {
        for (index, segment) in segments.iter().enumerate() {
            let Some(current) = entity else { return true };
            let last = index == segments.len() - 1;
            match self.oracle.classify(current, segment) {
                Classified::Capability if !last => {
                    entity = current
                        .capability(segment)
                        .and_then(|c| self.oracle.related_entity(c));
                }
                Classified::Column | Classified::JsonColumn if last => return true,
                _ => return false,
            }
        }
        true
    }

    /// Wrap the condition in existential constraints, one per traversed
    /// capability, and apply the column predicate at the innermost level.
    fn apply_traversal(
        &self,
        entity: Option<&EntityType>,
        segments: &[&str],
        op: Operator,
        value: &Value,
        query: &mut dyn QueryBuilder,
    ) {
        let head = segments[0];
        let related = entity
            .and_then(|e| e.capability(head))
            .and_then(|c| self.oracle.related_entity(c));
        let rest = &segments[1..];

        query.where_relationship_exists(head, &mut |scoped| {
            if rest.len() > 1 {
                self.apply_traversal(related, rest, op, value, scoped);
            } else {
                Self::apply_column(rest[0], op, value, scoped);
            }
        });
    }

    /// Operator semantics for a single column predicate, with value
    /// coercion. Malformed values skip the condition.
    fn apply_column(column: &str, op: Operator, value: &Value, query: &mut dyn QueryBuilder) {
        match op {
            Operator::Like | Operator::NotLike => {
                let Some(needle) = scalar_to_string(value) else {
                    return;
                };
                query.where_condition(column, op, &Value::String(format!("%{needle}%")));
            }
            Operator::In | Operator::NotIn => {
                let list = match value {
                    Value::Array(items) => items.clone(),
                    scalar => vec![scalar.clone()],
                };
                if list.is_empty() {
                    return;
                }
                query.where_condition(column, op, &Value::Array(list));
            }
            Operator::Between => {
                // Inclusive range; any arity other than two skips.
                let Some(bounds) = value.as_array() else {
                    return;
                };
                if bounds.len() != 2 {
                    return;
                }
                query.where_condition(column, op, value);
            }
            Operator::IsNull | Operator::IsNotNull => {
                if is_truthy(value) {
                    query.where_condition(column, op, &Value::Null);
                }
            }
            _ => query.where_condition(column, op, value),
        }
    }
}
