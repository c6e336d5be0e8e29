//! Decoded on-disk document: a JSON object keyed by model name.
//!
//! A top-level array of single-model objects is also accepted and folded
//! into one object in array order.

use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Document(Value);

impl Document {
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text).map(Self::from_value)
    }

    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => Self(fold_model_list(items)),
            other => Self(other),
        }
    }

    /// Build a document from `(model name, entry)` pairs, keeping their order.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        Self(Value::Object(entries.into_iter().collect::<Map<_, _>>()))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Top-level keys in file order; empty when the document is not an object.
    pub fn model_names(&self) -> Vec<&str> {
        self.0
            .as_object()
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.as_object().map_or(0, Map::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entry(&self, name: &str) -> Option<&Value> {
        self.0.as_object()?.get(name)
    }

    /// One single-entry document per model. A document that is not an
    /// object is returned unchanged so validation can report it.
    pub fn split(self) -> Vec<Document> {
        match self.0 {
            Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| Document::from_entries([(k, v)]))
                .collect(),
            other => vec![Document(other)],
        }
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.0)
    }
}

/// Fold `[{"a": {..}}, {"b": {..}}]` into `{"a": {..}, "b": {..}}`.
///
/// Each item contributes its first key. A key already taken becomes
/// `{key}_{index}`, and the entry's own `name` follows the new key. An
/// empty list, or one holding anything but non-empty objects, is kept as
/// an array.
fn fold_model_list(items: Vec<Value>) -> Value {
    let foldable = !items.is_empty()
        && items
            .iter()
            .all(|item| item.as_object().is_some_and(|m| !m.is_empty()));
    if !foldable {
        return Value::Array(items);
    }

    let mut models = Map::new();
    for (index, item) in items.into_iter().enumerate() {
        let Value::Object(map) = item else { continue };
        let Some((key, mut entry)) = map.into_iter().next() else {
            continue;
        };
        let key = if models.contains_key(&key) {
            let renamed = format!("{}_{}", key, index);
            if let Some(name) = entry.get_mut("name") {
                *name = Value::String(renamed.clone());
            }
            renamed
        } else {
            key
        };
        models.insert(key, entry);
    }
    Value::Object(models)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_model_order() {
        let doc = Document::from_entries([
            ("zeta".to_string(), json!({"name": "zeta"})),
            ("alpha".to_string(), json!({"name": "alpha"})),
        ]);
        assert_eq!(doc.model_names(), ["zeta", "alpha"]);
        let parts = doc.split();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1].model_names(), ["alpha"]);
    }

    #[test]
    fn model_list_is_folded_in_order() {
        let doc = Document::parse(
            r#"[{"b": {"name": "b"}}, {"a": {"name": "a"}}, {"b": {"name": "b", "n": 2}}]"#,
        )
        .unwrap();
        assert_eq!(doc.model_names(), ["b", "a", "b_2"]);
        assert_eq!(doc.entry("b_2"), Some(&json!({"name": "b_2", "n": 2})));
        assert_eq!(doc.entry("b"), Some(&json!({"name": "b"})));
    }

    #[test]
    fn non_object_document_has_no_models() {
        let doc = Document::parse("[1, 2]").unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.split().len(), 1);
    }
}
