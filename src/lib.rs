//! # Trellis
//!
//! The data-access core of a declarative CRUD framework: compiles textual
//! field and filter specifications supplied by API callers into executable
//! read operations, and performs structurally safe duplication of entities
//! including their relationships.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Caller input (field specs, filter trees, ids)     │
//! └─────────────────────────────────────────────────────────┘
//!        │                   │                    │
//!        ▼ [projection]      ▼ [filter]           ▼ [duplicate]
//!  ProjectionPlan      FilterExpression     DuplicationPlan
//!        │                   │                    │
//!        └────────┬──────────┘                    │
//!                 ▼                               ▼
//!      QueryBuilder (storage seam)        Datastore (storage seam)
//! ```
//!
//! All three components consult the same [`schema::SchemaOracle`], built
//! over a [`model::SchemaRegistry`] declared at startup. The compilers
//! never perform I/O themselves; they drive the storage seams and leave
//! execution to the storage layer.
//!
//! The specification languages are deliberately tolerant: unknown fields
//! are dropped and malformed operator values skip their single condition,
//! so partially wrong caller input degrades to a broader read instead of
//! an error.

pub mod compile;
pub mod config;
pub mod duplicate;
pub mod filter;
pub mod model;
pub mod projection;
pub mod query;
pub mod schema;
pub mod value;

pub use compile::{apply_read, compile_read, CompiledRead, FieldsParam, ReadRequest};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compile::{apply_read, compile_read, CompiledRead, FieldsParam, ReadRequest};
    pub use crate::config::{DuplicationSettings, LocaleSettings, Settings};
    pub use crate::duplicate::{
        partition_attributes, CopyValue, DuplicateError, DuplicationEngine, DuplicationPlan,
    };
    pub use crate::filter::{Condition, FilterExpression, PredicateCompiler};
    pub use crate::model::{
        Capability, CastType, Column, EntityType, Loaded, Record, SchemaRegistry, SemanticType,
        StorageType,
    };
    pub use crate::projection::{ProjectionCompiler, ProjectionPlan, RelationProjection};
    pub use crate::query::{
        Datastore, MemoryStore, Operator, QueryBuilder, RecordingQuery, StoreError,
    };
    pub use crate::schema::{Classified, SchemaOracle};
}
