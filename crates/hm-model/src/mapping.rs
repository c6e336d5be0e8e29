//! Shape detection for caller-supplied mappings.

use serde_json::{Map, Value};

/// What a mapping handed to `from_mapping` turned out to be.
#[derive(Debug, PartialEq)]
pub(crate) enum MappingShape<'a> {
    /// A model entry (`{"name": .., "data": [..]}`), optionally wrapped
    /// in a single-key document.
    Entry {
        key: Option<&'a str>,
        entry: &'a Map<String, Value>,
    },
    /// Field name to column values, optionally wrapped under a model name.
    Columns {
        key: Option<&'a str>,
        columns: &'a Map<String, Value>,
    },
}

/// A single key holding an object is a model name wrapping the body.
/// The body is an entry when it carries a `data` array, columns otherwise.
pub(crate) fn classify(map: &Map<String, Value>) -> MappingShape<'_> {
    let (key, body) = match single_object_entry(map) {
        Some((key, body)) => (Some(key), body),
        None => (None, map),
    };
    if matches!(body.get("data"), Some(Value::Array(_))) {
        MappingShape::Entry { key, entry: body }
    } else {
        MappingShape::Columns { key, columns: body }
    }
}

fn single_object_entry(map: &Map<String, Value>) -> Option<(&str, &Map<String, Value>)> {
    if map.len() != 1 {
        return None;
    }
    let (key, value) = map.iter().next()?;
    value.as_object().map(|body| (key.as_str(), body))
}

/// Remove `null` members from every object, recursively.
pub(crate) fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}
