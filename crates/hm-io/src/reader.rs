//! Model file reader.

use std::fs;
use std::path::Path;

use hm_model::ModelEntity;
use hm_schema::{Category, Document, ValidationError, validate};
use tracing::{debug, info, instrument};

use crate::HesmaResult;

/// Read a single-model file.
///
/// The document is validated before any entity is built; the first
/// violation is returned.
#[instrument(skip_all, fields(path = %path.as_ref().display(), category = %category))]
pub fn read(path: impl AsRef<Path>, category: Category) -> HesmaResult<ModelEntity> {
    let document = decode_file(path.as_ref())?;
    read_document(&document, category)
}

/// Read every model of a (possibly multi-model) file, in file order.
///
/// The file may also hold a list of single-model objects; see
/// [`Document::from_value`] for how repeated names are renamed.
#[instrument(skip_all, fields(path = %path.as_ref().display(), category = %category))]
pub fn read_all(path: impl AsRef<Path>, category: Category) -> HesmaResult<Vec<ModelEntity>> {
    let document = decode_file(path.as_ref())?;
    read_all_document(document, category)
}

/// Model names of a file, in file order. Entries are not validated.
pub fn list_models(path: impl AsRef<Path>) -> HesmaResult<Vec<String>> {
    let document = decode_file(path.as_ref())?;
    if !document.as_value().is_object() {
        return Err(not_an_object().into());
    }
    Ok(document.model_names().into_iter().map(str::to_string).collect())
}

/// [`read`] on an in-memory JSON string.
pub fn read_str(text: &str, category: Category) -> HesmaResult<ModelEntity> {
    read_document(&Document::parse(text)?, category)
}

/// [`read_all`] on an in-memory JSON string.
pub fn read_all_str(text: &str, category: Category) -> HesmaResult<Vec<ModelEntity>> {
    read_all_document(Document::parse(text)?, category)
}

fn decode_file(path: &Path) -> HesmaResult<Document> {
    let content = fs::read_to_string(path)?;
    debug!(bytes = content.len(), "decoding model file");
    Ok(Document::parse(&content)?)
}

fn read_document(document: &Document, category: Category) -> HesmaResult<ModelEntity> {
    validate(document, category)?;
    let (key, entry) = document
        .as_value()
        .as_object()
        .and_then(|map| map.iter().next())
        .ok_or_else(not_an_object)?;
    let entity = ModelEntity::from_entry(category, key, entry)?;
    info!(model = entity.name(), category = %entity.category(), "model read");
    Ok(entity)
}

fn read_all_document(document: Document, category: Category) -> HesmaResult<Vec<ModelEntity>> {
    if !document.as_value().is_object() {
        return Err(not_an_object().into());
    }
    if document.is_empty() {
        return Err(ValidationError::MultipleTopLevelEntries { count: 0 }.into());
    }
    let parts = document.split();
    debug!(models = parts.len(), "splitting multi-model document");
    parts
        .iter()
        .map(|part| read_document(part, category))
        .collect()
}

fn not_an_object() -> ValidationError {
    ValidationError::NotAnObject {
        context: "document".to_string(),
    }
}
