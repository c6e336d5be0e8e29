//! Caller-supplied model metadata.

use hm_core::{ShapeError, ShapeResult};
use hm_schema::{ModelHeader, Source, Units};
use serde_json::{Map, Value};

/// Optional name, provenance, units and sources attached to input data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub model_name: Option<String>,
    pub schema: Option<String>,
    pub units: Units,
    pub sources: Vec<Source>,
}

impl Metadata {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            model_name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_unit(mut self, field: impl Into<String>, unit: impl Into<String>) -> Self {
        self.units.insert(field.into(), unit.into());
        self
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.sources.push(source);
        self
    }

    /// Header for a model whose name may be inferred from the input.
    pub fn header(&self, inferred: Option<&str>, context: &str) -> ShapeResult<ModelHeader> {
        let name = self
            .model_name
            .as_deref()
            .or(inferred)
            .ok_or_else(|| ShapeError::MissingModelName {
                context: context.to_string(),
            })?;
        Ok(ModelHeader {
            name: name.to_string(),
            schema: self.schema.clone(),
            sources: self.sources.clone(),
            units: self.units.clone(),
        })
    }

    /// Overlay this metadata onto a raw model entry. Units are merged with
    /// caller entries winning; schema and sources replace the entry's own.
    pub(crate) fn apply_to_entry(
        &self,
        entry: &mut Map<String, Value>,
    ) -> serde_json::Result<()> {
        if let Some(name) = &self.model_name {
            entry.insert("name".to_string(), Value::String(name.clone()));
        }
        if let Some(schema) = &self.schema {
            entry.insert("schema".to_string(), Value::String(schema.clone()));
        }
        if !self.sources.is_empty() {
            entry.insert("sources".to_string(), serde_json::to_value(&self.sources)?);
        }
        if !self.units.is_empty() {
            let units = entry
                .entry("units".to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !units.is_object() {
                *units = Value::Object(Map::new());
            }
            if let Value::Object(units) = units {
                for (field, unit) in &self.units {
                    units.insert(field.clone(), Value::String(unit.clone()));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn explicit_name_wins_over_inferred() {
        let header = Metadata::named("explicit")
            .header(Some("inferred"), "test")
            .unwrap();
        assert_eq!(header.name, "explicit");
        let header = Metadata::default().header(Some("inferred"), "test").unwrap();
        assert_eq!(header.name, "inferred");
    }

    #[test]
    fn missing_name_is_an_error() {
        let err = Metadata::default().header(None, "table has no name").unwrap_err();
        assert!(matches!(err, ShapeError::MissingModelName { .. }));
    }

    #[test]
    fn overlay_merges_units() {
        let mut entry = json!({"name": "m", "units": {"radius": "km", "time": "s"}})
            .as_object()
            .cloned()
            .unwrap();
        Metadata::default()
            .with_unit("radius", "cm")
            .apply_to_entry(&mut entry)
            .unwrap();
        assert_eq!(entry["units"], json!({"radius": "cm", "time": "s"}));
        assert_eq!(entry["name"], json!("m"));
    }

    #[test]
    fn overlay_replaces_schema_and_sources() {
        let mut entry = json!({"name": "m", "schema": "old", "sources": [{"url": "x"}]})
            .as_object()
            .cloned()
            .unwrap();
        let source = Source {
            bibcode: Some("2021A&A...1A".to_string()),
            reference: None,
            url: None,
        };
        Metadata::default()
            .with_schema("custom")
            .with_source(source)
            .apply_to_entry(&mut entry)
            .unwrap();
        assert_eq!(entry["schema"], json!("custom"));
        assert_eq!(entry["sources"], json!([{"bibcode": "2021A&A...1A"}]));
    }
}
