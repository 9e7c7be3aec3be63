//! Value-level helpers shared across the components.

use serde_json::{Map, Value};

use crate::model::{EntityType, Loaded, Record};
use crate::schema::SchemaOracle;

/// Walk a dotted path inside a JSON value. Object keys and numeric array
/// indices are both supported.
pub fn get_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Decode a localized map (locale → text), tolerating values stored as
/// JSON strings.
pub fn decode_localized(value: &Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map.clone()),
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        },
        _ => None,
    }
}

/// Loose truthiness for flag-style operator values: `null`, `false`, `0`,
/// `""`, `"0"` and `"false"` are all falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0" && s != "false",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Render a scalar for substring matching. Non-scalar values have no
/// sensible substring form.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read a dotted field from a loaded record.
///
/// A structured-cast head descends into the stored value; a loaded
/// relationship head descends through the related record(s); anything
/// else reads the attribute itself (descending value-level when the
/// attribute holds a document).
pub fn nested_field_value<'a>(
    record: &'a Record,
    entity: Option<&EntityType>,
    oracle: &SchemaOracle,
    field: &str,
) -> Option<&'a Value> {
    let Some((head, rest)) = field.split_once('.') else {
        return record.get(field);
    };

    if let Some(entity) = entity {
        if oracle.is_json_column(entity, head) {
            return get_path(record.get(head)?, rest);
        }
    }

    match record.relationships.get(head) {
        Some(Loaded::One(Some(related))) => {
            let next = entity
                .and_then(|e| e.capability(head))
                .and_then(|c| oracle.related_entity(c));
            nested_field_value(related, next, oracle, rest)
        }
        Some(Loaded::Many(records)) => {
            let (index, remainder) = match rest.split_once('.') {
                Some((i, r)) => (i, Some(r)),
                None => (rest, None),
            };
            let related = records.get(index.parse::<usize>().ok()?)?;
            match remainder {
                Some(path) => {
                    let next = entity
                        .and_then(|e| e.capability(head))
                        .and_then(|c| oracle.related_entity(c));
                    nested_field_value(related, next, oracle, path)
                }
                None => None,
            }
        }
        Some(Loaded::One(None)) | Some(Loaded::Ids(_)) => None,
        None => get_path(record.get(head)?, rest),
    }
}
