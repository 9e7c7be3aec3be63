//! Recording query builder for compiler tests and previews.

use serde_json::Value;

use super::{Operator, QueryBuilder, Scope};

/// A single operation applied to a [`RecordingQuery`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedOp {
    Select(Vec<String>),
    Where {
        column: String,
        op: Operator,
        value: Value,
    },
    With {
        name: String,
        scope: RecordingQuery,
    },
    Exists {
        name: String,
        scope: RecordingQuery,
    },
}

/// Captures every operation the compilers apply, preserving nesting, and
/// renders a compact textual form for assertions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordingQuery {
    pub ops: Vec<RecordedOp>,
}

impl RecordingQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first column selection applied at this level, if any.
    pub fn selected_columns(&self) -> Option<&[String]> {
        self.ops.iter().find_map(|op| match op {
            RecordedOp::Select(columns) => Some(columns.as_slice()),
            _ => None,
        })
    }

    /// The scoped recording for a named relationship loader, if present.
    pub fn relationship(&self, name: &str) -> Option<&RecordingQuery> {
        self.ops.iter().find_map(|op| match op {
            RecordedOp::With { name: n, scope } if n == name => Some(scope),
            _ => None,
        })
    }

    /// Render the recorded tree, one operation per line, nested scopes
    /// indented by two spaces.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out.trim_end().to_string()
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        let pad = "  ".repeat(depth);
        for op in &self.ops {
            match op {
                RecordedOp::Select(columns) => {
                    out.push_str(&format!("{}select {}\n", pad, columns.join(", ")));
                }
                RecordedOp::Where { column, op, value } => {
                    if matches!(op, Operator::IsNull | Operator::IsNotNull) {
                        out.push_str(&format!("{}where {} {}\n", pad, column, op.symbol()));
                    } else {
                        out.push_str(&format!(
                            "{}where {} {} {}\n",
                            pad,
                            column,
                            op.symbol(),
                            value
                        ));
                    }
                }
                RecordedOp::With { name, scope } => {
                    out.push_str(&format!("{}with {}\n", pad, name));
                    scope.render_into(out, depth + 1);
                }
                RecordedOp::Exists { name, scope } => {
                    out.push_str(&format!("{}exists {}\n", pad, name));
                    scope.render_into(out, depth + 1);
                }
            }
        }
    }
}

impl QueryBuilder for RecordingQuery {
    fn select_columns(&mut self, columns: &[String]) {
        self.ops.push(RecordedOp::Select(columns.to_vec()));
    }

    fn with_relationship(&mut self, name: &str, scope: Scope<'_>) {
        let mut inner = RecordingQuery::new();
        scope(&mut inner);
        self.ops.push(RecordedOp::With {
            name: name.to_string(),
            scope: inner,
        });
    }

    fn where_condition(&mut self, column: &str, op: Operator, value: &Value) {
        self.ops.push(RecordedOp::Where {
            column: column.to_string(),
            op,
            value: value.clone(),
        });
    }

    fn where_relationship_exists(&mut self, name: &str, scope: Scope<'_>) {
        let mut inner = RecordingQuery::new();
        scope(&mut inner);
        self.ops.push(RecordedOp::Exists {
            name: name.to_string(),
            scope: inner,
        });
    }
}
