//! End-to-end compilation of caller read requests.
//!
//! This module provides the high-level API tying the two read compilers
//! together:
//!
//! ```text
//! ReadRequest { fields, filters } → ProjectionPlan + FilterExpression → QueryBuilder
//! ```
//!
//! # Example
//!
//! ```ignore
//! use trellis::compile::{apply_read, ReadRequest};
//! use trellis::query::RecordingQuery;
//!
//! let request = ReadRequest {
//!     fields: Some("id,title,tags.name".into()),
//!     filters: Some(serde_json::json!({
//!         "_and": { "tags.name": { "_like": "sale" } }
//!     })),
//! };
//!
//! let mut query = RecordingQuery::new();
//! apply_read(&oracle, Some(&post), &request, &mut query);
//! ```

use serde::Deserialize;
use serde_json::Value;

use crate::filter::{FilterExpression, PredicateCompiler};
use crate::model::EntityType;
use crate::projection::{ProjectionCompiler, ProjectionPlan};
use crate::query::QueryBuilder;
use crate::schema::SchemaOracle;

/// A field specification as callers send it: either one comma-separated
/// string or a list of paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldsParam {
    Spec(String),
    List(Vec<String>),
}

impl FieldsParam {
    /// The canonical comma-separated form.
    pub fn to_spec(&self) -> String {
        match self {
            FieldsParam::Spec(spec) => spec.clone(),
            FieldsParam::List(paths) => paths.join(","),
        }
    }
}

impl From<&str> for FieldsParam {
    fn from(spec: &str) -> Self {
        FieldsParam::Spec(spec.to_string())
    }
}

/// A caller-supplied read request: an optional field specification plus
/// an optional filter tree.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadRequest {
    #[serde(default)]
    pub fields: Option<FieldsParam>,

    #[serde(default)]
    pub filters: Option<Value>,
}

/// The compiled form of a read request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRead {
    pub projection: ProjectionPlan,
    pub filter: FilterExpression,
}

/// Compile a read request against one entity type.
pub fn compile_read(
    oracle: &SchemaOracle,
    entity: Option<&EntityType>,
    request: &ReadRequest,
) -> CompiledRead {
    let spec = request.fields.as_ref().map(FieldsParam::to_spec);
    let projection = ProjectionCompiler::new(oracle).compile(spec.as_deref(), entity);
    let filter = request
        .filters
        .as_ref()
        .map(FilterExpression::from_value)
        .unwrap_or_default();
    CompiledRead { projection, filter }
}

/// Compile and apply a read request to a query in one step.
pub fn apply_read(
    oracle: &SchemaOracle,
    entity: Option<&EntityType>,
    request: &ReadRequest,
    query: &mut dyn QueryBuilder,
) -> CompiledRead {
    let compiled = compile_read(oracle, entity, request);
    ProjectionCompiler::new(oracle).apply(&compiled.projection, entity, query);
    PredicateCompiler::new(oracle).apply(&compiled.filter, entity, query);
    compiled
}
