//! Document validation against the per-category rule tables.
//!
//! Checks run in a fixed order: single top-level entry, name/key
//! agreement, required fields, field names, then cardinality. The first
//! violation is returned; the document is never modified.

use serde_json::{Map, Value};

use crate::category::{Category, CategoryRules, ExtraFields, FieldKind, FieldRule};
use crate::document::Document;
use crate::field::is_abundance_name;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field '{field}' in {context} of model '{model}'")]
    MissingRequiredField {
        model: String,
        field: String,
        context: String,
    },

    #[error("Wrong cardinality for {context} of model '{model}': expected {expected}, got {actual}")]
    WrongCardinality {
        model: String,
        context: String,
        expected: String,
        actual: usize,
    },

    #[error("Invalid field name '{field}' in {context} of model '{model}'")]
    InvalidFieldName {
        model: String,
        field: String,
        context: String,
    },

    #[error("Model name '{name}' does not match its key '{key}'")]
    NameKeyMismatch { key: String, name: String },

    #[error("Expected exactly one top-level model entry, found {count}")]
    MultipleTopLevelEntries { count: usize },

    #[error("Field '{field}' in {context} of model '{model}' must be {expected}")]
    WrongFieldType {
        model: String,
        field: String,
        context: String,
        expected: &'static str,
    },

    #[error("{context} must be a JSON object")]
    NotAnObject { context: String },
}

pub type ValidationResult = Result<(), ValidationError>;

/// Validate a single-model document.
pub fn validate(document: &Document, category: Category) -> ValidationResult {
    let map = document
        .as_value()
        .as_object()
        .ok_or_else(|| ValidationError::NotAnObject {
            context: "document".to_string(),
        })?;

    if map.len() != 1 {
        return Err(ValidationError::MultipleTopLevelEntries { count: map.len() });
    }

    match map.iter().next() {
        Some((key, entry)) => validate_entry(key, entry, category),
        None => Err(ValidationError::MultipleTopLevelEntries { count: 0 }),
    }
}

/// Validate one model entry stored under `key`.
pub fn validate_entry(key: &str, entry: &Value, category: Category) -> ValidationResult {
    let rules = category.rules();
    let entry = entry
        .as_object()
        .ok_or_else(|| ValidationError::NotAnObject {
            context: format!("model '{}'", key),
        })?;

    match entry.get("name") {
        None | Some(Value::Null) => {
            return Err(ValidationError::MissingRequiredField {
                model: key.to_string(),
                field: "name".to_string(),
                context: "model entry".to_string(),
            });
        }
        Some(Value::String(name)) if name != key => {
            return Err(ValidationError::NameKeyMismatch {
                key: key.to_string(),
                name: name.clone(),
            });
        }
        Some(Value::String(_)) => {}
        Some(_) => {
            return Err(wrong_type(key, "name", "model entry", FieldKind::Text));
        }
    }

    validate_header(key, entry)?;

    let points = match entry.get("data") {
        None | Some(Value::Null) => {
            return Err(ValidationError::MissingRequiredField {
                model: key.to_string(),
                field: "data".to_string(),
                context: "model entry".to_string(),
            });
        }
        Some(Value::Array(points)) => points,
        Some(_) => {
            return Err(ValidationError::WrongFieldType {
                model: key.to_string(),
                field: "data".to_string(),
                context: "model entry".to_string(),
                expected: "an array",
            });
        }
    };

    let derived = match (rules.derived_fields, entry.get("derived_data")) {
        (Some(derived_rules), Some(Value::Array(rows))) => Some((derived_rules, rows)),
        (Some(_), None | Some(Value::Null)) | (None, _) => None,
        (Some(_), Some(_)) => {
            return Err(ValidationError::WrongFieldType {
                model: key.to_string(),
                field: "derived_data".to_string(),
                context: "model entry".to_string(),
                expected: "an array",
            });
        }
    };

    let point_objects = as_objects(key, "data", points)?;
    let derived_objects = match derived {
        Some((derived_rules, rows)) => {
            Some((derived_rules, as_objects(key, "derived_data", rows)?))
        }
        None => None,
    };

    for (i, point) in point_objects.iter().enumerate() {
        check_required(key, &format!("data[{}]", i), point, rules.point_fields)?;
    }
    if let Some((derived_rules, rows)) = &derived_objects {
        for (i, row) in rows.iter().enumerate() {
            check_required(key, &format!("derived_data[{}]", i), row, derived_rules)?;
        }
    }

    for (i, point) in point_objects.iter().enumerate() {
        check_fields(
            key,
            &format!("data[{}]", i),
            point,
            rules.point_fields,
            rules.extra_fields,
        )?;
        if rules.equal_length_arrays {
            check_array_lengths(key, &format!("data[{}]", i), point, rules)?;
        }
    }
    if let Some((derived_rules, rows)) = &derived_objects {
        for (i, row) in rows.iter().enumerate() {
            check_fields(
                key,
                &format!("derived_data[{}]", i),
                row,
                derived_rules,
                ExtraFields::Reject,
            )?;
        }
    }

    if point_objects.len() < rules.min_points {
        return Err(ValidationError::WrongCardinality {
            model: key.to_string(),
            context: "data".to_string(),
            expected: format!("at least {}", rules.min_points),
            actual: point_objects.len(),
        });
    }

    Ok(())
}

fn validate_header(key: &str, entry: &Map<String, Value>) -> ValidationResult {
    match entry.get("schema") {
        None | Some(Value::Null) | Some(Value::String(_)) => {}
        Some(_) => return Err(wrong_type(key, "schema", "model entry", FieldKind::Text)),
    }

    match entry.get("sources") {
        None | Some(Value::Null) => {}
        Some(Value::Array(sources)) => {
            for (i, source) in sources.iter().enumerate() {
                let context = format!("sources[{}]", i);
                let source = source
                    .as_object()
                    .ok_or_else(|| ValidationError::NotAnObject {
                        context: format!("{} of model '{}'", context, key),
                    })?;
                for field in ["bibcode", "reference", "url"] {
                    if let Some(v) = source.get(field)
                        && !(v.is_string() || v.is_null())
                    {
                        return Err(wrong_type(key, field, &context, FieldKind::Text));
                    }
                }
            }
        }
        Some(_) => {
            return Err(ValidationError::WrongFieldType {
                model: key.to_string(),
                field: "sources".to_string(),
                context: "model entry".to_string(),
                expected: "an array",
            });
        }
    }

    match entry.get("units") {
        None | Some(Value::Null) => {}
        Some(Value::Object(units)) => {
            for (field, unit) in units {
                if !unit.is_string() {
                    return Err(wrong_type(key, field, "units", FieldKind::Text));
                }
            }
        }
        Some(_) => {
            return Err(ValidationError::WrongFieldType {
                model: key.to_string(),
                field: "units".to_string(),
                context: "model entry".to_string(),
                expected: "an object",
            });
        }
    }

    Ok(())
}

fn as_objects<'a>(
    key: &str,
    field: &str,
    rows: &'a [Value],
) -> Result<Vec<&'a Map<String, Value>>, ValidationError> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            row.as_object().ok_or_else(|| ValidationError::NotAnObject {
                context: format!("{}[{}] of model '{}'", field, i, key),
            })
        })
        .collect()
}

fn check_required(
    key: &str,
    context: &str,
    point: &Map<String, Value>,
    rules: &[FieldRule],
) -> ValidationResult {
    for rule in rules.iter().filter(|r| r.required) {
        if point.get(rule.name).is_none_or(Value::is_null) {
            return Err(ValidationError::MissingRequiredField {
                model: key.to_string(),
                field: rule.name.to_string(),
                context: context.to_string(),
            });
        }
    }
    Ok(())
}

fn check_fields(
    key: &str,
    context: &str,
    point: &Map<String, Value>,
    rules: &[FieldRule],
    extra: ExtraFields,
) -> ValidationResult {
    for (field, value) in point {
        let kind = match rules.iter().find(|r| r.name == field) {
            Some(rule) => rule.kind,
            None => match extra {
                ExtraFields::Abundances if is_abundance_name(field) => FieldKind::Number,
                ExtraFields::Allow => continue,
                ExtraFields::Abundances | ExtraFields::Reject => {
                    return Err(ValidationError::InvalidFieldName {
                        model: key.to_string(),
                        field: field.clone(),
                        context: context.to_string(),
                    });
                }
            },
        };
        if !value.is_null() && !matches_kind(value, kind) {
            return Err(wrong_type(key, field, context, kind));
        }
    }
    Ok(())
}

fn check_array_lengths(
    key: &str,
    context: &str,
    point: &Map<String, Value>,
    rules: &CategoryRules,
) -> ValidationResult {
    let mut expected: Option<usize> = None;
    for rule in rules
        .point_fields
        .iter()
        .filter(|r| r.kind == FieldKind::NumberArray)
    {
        let Some(Value::Array(values)) = point.get(rule.name) else {
            continue;
        };
        match expected {
            None => expected = Some(values.len()),
            Some(n) if n != values.len() => {
                return Err(ValidationError::WrongCardinality {
                    model: key.to_string(),
                    context: format!("{}.{}", context, rule.name),
                    expected: n.to_string(),
                    actual: values.len(),
                });
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn matches_kind(value: &Value, kind: FieldKind) -> bool {
    match kind {
        FieldKind::Number => value.is_number(),
        FieldKind::Text => value.is_string(),
        FieldKind::NumberArray => value
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_number)),
    }
}

fn wrong_type(key: &str, field: &str, context: &str, kind: FieldKind) -> ValidationError {
    ValidationError::WrongFieldType {
        model: key.to_string(),
        field: field.to_string(),
        context: context.to_string(),
        expected: kind.describe(),
    }
}
