//! Model file writer.
//!
//! The whole document is assembled and validated in memory before the
//! filesystem is touched, so a rejected write leaves nothing behind.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use hm_core::{ShapeError, Table};
use hm_model::{FieldArray, Metadata, ModelEntity, ModelError, ModelResult, entry_value};
use hm_schema::{Category, Document, SCHEMA_URL, Source, Units, validate};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::merge::{merge_spectra, merge_spectra_nested, sort_lightcurve_samples};
use crate::{HesmaError, HesmaResult};

/// Input data for [`write`]. Each variant but the timestep ones holds one
/// item per model.
#[derive(Debug, Clone)]
pub enum DataSource {
    Tables(Vec<Table>),
    Mappings(Vec<Map<String, Value>>),
    Arrays(Vec<Vec<FieldArray>>),
    /// Flat list of per-timestep spectrum tables, split across
    /// [`WriteOptions::num_models`] models.
    Timesteps(Vec<Table>),
    /// Per-timestep spectrum tables, one inner list per model.
    NestedTimesteps(Vec<Vec<Table>>),
}

impl DataSource {
    fn kind(&self) -> &'static str {
        match self {
            DataSource::Tables(_) => "tables",
            DataSource::Mappings(_) => "mappings",
            DataSource::Arrays(_) => "arrays",
            DataSource::Timesteps(_) => "timesteps",
            DataSource::NestedTimesteps(_) => "nested timesteps",
        }
    }
}

/// Document-level metadata shared by every written model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteMetadata {
    /// One name per model, in input order.
    pub model_names: Option<Vec<String>>,
    /// Provenance URL; [`SCHEMA_URL`] when absent.
    pub schema: Option<String>,
    pub units: Units,
    pub sources: Vec<Source>,
}

impl WriteMetadata {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            model_names: Some(vec![name.into()]),
            ..Self::default()
        }
    }

    fn model_metadata(&self, index: usize) -> Metadata {
        Metadata {
            model_name: self
                .model_names
                .as_ref()
                .and_then(|names| names.get(index).cloned()),
            schema: self.schema.clone(),
            units: self.units.clone(),
            sources: self.sources.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WriteOptions {
    /// Replace an existing file.
    pub overwrite: bool,
    /// Create missing parent directories.
    pub create_dirs: bool,
    /// Name unnamed models `model_0`, `model_1`, ... instead of failing.
    pub auto_name: bool,
    /// Model count for [`DataSource::Timesteps`] and
    /// [`DataSource::NestedTimesteps`]; one model when absent.
    pub num_models: Option<usize>,
    /// Lightcurve derived-quantity tables, one per model.
    pub derived_data: Vec<Table>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            create_dirs: true,
            auto_name: false,
            num_models: None,
            derived_data: Vec::new(),
        }
    }
}

/// Write a single table as one model.
pub fn write_from_table(
    table: &Table,
    path: impl AsRef<Path>,
    category: Category,
    metadata: &WriteMetadata,
    options: &WriteOptions,
) -> HesmaResult<()> {
    write(
        DataSource::Tables(vec![table.clone()]),
        path,
        category,
        metadata,
        options,
    )
}

/// Write a single mapping (columns or model entry) as one model.
pub fn write_from_mapping(
    mapping: &Map<String, Value>,
    path: impl AsRef<Path>,
    category: Category,
    metadata: &WriteMetadata,
    options: &WriteOptions,
) -> HesmaResult<()> {
    write(
        DataSource::Mappings(vec![mapping.clone()]),
        path,
        category,
        metadata,
        options,
    )
}

/// Write one set of named arrays as one model.
pub fn write_from_arrays(
    arrays: Vec<FieldArray>,
    path: impl AsRef<Path>,
    category: Category,
    metadata: &WriteMetadata,
    options: &WriteOptions,
) -> HesmaResult<()> {
    write(DataSource::Arrays(vec![arrays]), path, category, metadata, options)
}

/// Normalize `source` into models, validate them and write one document.
#[instrument(
    skip_all,
    fields(path = %path.as_ref().display(), category = %category, source = source.kind())
)]
pub fn write(
    source: DataSource,
    path: impl AsRef<Path>,
    category: Category,
    metadata: &WriteMetadata,
    options: &WriteOptions,
) -> HesmaResult<()> {
    let entities = build_entities(source, category, metadata, options)?;
    write_entities(&entities, path, metadata.schema.as_deref(), options)
}

/// Write already-built models as one document.
pub fn write_entities(
    entities: &[ModelEntity],
    path: impl AsRef<Path>,
    schema: Option<&str>,
    options: &WriteOptions,
) -> HesmaResult<()> {
    let path = path.as_ref();
    let content = render_document(entities, schema)?;

    if path.exists() && !options.overwrite {
        return Err(HesmaError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    if options.create_dirs
        && let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &content)?;
    info!(
        path = %path.display(),
        models = entities.len(),
        bytes = content.len(),
        "model file written"
    );
    Ok(())
}

/// The document text for `entities`, with `schema` (or [`SCHEMA_URL`])
/// stamped where a model has none and units completed. Every entry is
/// validated as a single-model document.
pub fn render_document(entities: &[ModelEntity], schema: Option<&str>) -> HesmaResult<String> {
    if entities.is_empty() {
        return Err(HesmaError::InvalidMetadata {
            what: "no models to write".to_string(),
        });
    }
    check_unique_names(entities.iter().map(ModelEntity::name))?;

    let mut entries = Vec::with_capacity(entities.len());
    for entity in entities {
        let mut entity = entity.clone();
        sort_lightcurve_samples(&mut entity);
        let units = entity.units();
        let header = entity.header_mut();
        if header.schema.is_none() {
            header.schema = Some(schema.unwrap_or(SCHEMA_URL).to_string());
        }
        header.units = units;

        let entry = entity.to_entry_value()?;
        let single = Document::from_entries([(entity.name().to_string(), entry.clone())]);
        validate(&single, entity.category())?;
        entries.push((entity.name().to_string(), entry));
    }

    let document = Document::from_entries(entries);
    debug!(models = document.len(), "document assembled");
    Ok(document.to_json_string()?)
}

fn build_entities(
    source: DataSource,
    category: Category,
    metadata: &WriteMetadata,
    options: &WriteOptions,
) -> HesmaResult<Vec<ModelEntity>> {
    check_sources(&metadata.sources)?;

    let entities = match source {
        DataSource::Tables(tables) => {
            check_model_count(metadata, tables.len())?;
            tables
                .iter()
                .enumerate()
                .map(|(i, table)| {
                    named_model(i, metadata, options, |meta| {
                        ModelEntity::from_table(category, table, meta)
                    })
                })
                .collect::<HesmaResult<Vec<_>>>()?
        }
        DataSource::Mappings(mappings) => {
            check_model_count(metadata, mappings.len())?;
            mappings
                .iter()
                .enumerate()
                .map(|(i, mapping)| {
                    named_model(i, metadata, options, |meta| {
                        ModelEntity::from_mapping(category, mapping, meta)
                    })
                })
                .collect::<HesmaResult<Vec<_>>>()?
        }
        DataSource::Arrays(models) => {
            check_model_count(metadata, models.len())?;
            models
                .into_iter()
                .enumerate()
                .map(|(i, arrays)| {
                    named_model(i, metadata, options, |meta| {
                        ModelEntity::from_arrays(category, arrays.clone(), meta)
                    })
                })
                .collect::<HesmaResult<Vec<_>>>()?
        }
        DataSource::Timesteps(tables) => {
            let num_models = options.num_models.unwrap_or(1);
            let merged = merge_spectra(&tables, num_models)?;
            let per_model = tables.len() / num_models;
            let first_tables = (0..num_models).map(|i| tables.get(i * per_model));
            spectrum_entities(merged, first_tables, category, metadata, options)?
        }
        DataSource::NestedTimesteps(models) => {
            let num_models = options.num_models.unwrap_or(models.len());
            let merged = merge_spectra_nested(&models, num_models)?;
            let first_tables = models.iter().map(|tables| tables.first());
            spectrum_entities(merged, first_tables, category, metadata, options)?
        }
    };

    attach_derived(entities, options)
}

/// Build model `index`, falling back to `model_{index}` when no name can
/// be found and auto naming is on.
fn named_model<F>(
    index: usize,
    metadata: &WriteMetadata,
    options: &WriteOptions,
    build: F,
) -> HesmaResult<ModelEntity>
where
    F: Fn(&Metadata) -> ModelResult<ModelEntity>,
{
    let meta = metadata.model_metadata(index);
    match build(&meta) {
        Err(ModelError::Shape(ShapeError::MissingModelName { .. })) if options.auto_name => {
            let name = format!("model_{}", index);
            debug!(%name, "assigning default model name");
            Ok(build(&Metadata {
                model_name: Some(name),
                ..meta
            })?)
        }
        other => Ok(other?),
    }
}

fn spectrum_entities<'a>(
    merged: Vec<Vec<Value>>,
    first_tables: impl Iterator<Item = Option<&'a Table>>,
    category: Category,
    metadata: &WriteMetadata,
    options: &WriteOptions,
) -> HesmaResult<Vec<ModelEntity>> {
    if !matches!(category, Category::Spectrum | Category::RtGeneric) {
        return Err(HesmaError::CategoryMismatch {
            expected: Category::Spectrum,
            actual: category,
        });
    }
    check_model_count(metadata, merged.len())?;
    merged
        .into_iter()
        .zip(first_tables)
        .enumerate()
        .map(|(i, (data, first))| {
            named_model(i, metadata, options, |meta| {
                let header = meta.header(
                    first.and_then(Table::name),
                    "no model name given and the timestep tables are unnamed",
                )?;
                let entry = entry_value(&header, data.clone())?;
                ModelEntity::from_entry(Category::Spectrum, &header.name, &entry)
            })
        })
        .collect()
}

fn attach_derived(
    entities: Vec<ModelEntity>,
    options: &WriteOptions,
) -> HesmaResult<Vec<ModelEntity>> {
    if options.derived_data.is_empty() {
        return Ok(entities);
    }
    if options.derived_data.len() != entities.len() {
        return Err(HesmaError::InvalidMetadata {
            what: format!(
                "{} derived-data tables for {} models",
                options.derived_data.len(),
                entities.len()
            ),
        });
    }
    entities
        .into_iter()
        .zip(&options.derived_data)
        .map(|(entity, derived)| Ok(entity.with_derived_table(derived)?))
        .collect()
}

fn check_sources(sources: &[Source]) -> HesmaResult<()> {
    match sources.iter().position(Source::is_empty) {
        Some(i) => Err(HesmaError::InvalidMetadata {
            what: format!("source {} has no bibcode, reference or url", i),
        }),
        None => Ok(()),
    }
}

fn check_model_count(metadata: &WriteMetadata, models: usize) -> HesmaResult<()> {
    match &metadata.model_names {
        Some(names) if names.len() != models => Err(HesmaError::InvalidMetadata {
            what: format!("{} model names for {} models", names.len(), models),
        }),
        _ => Ok(()),
    }
}

fn check_unique_names<'a>(names: impl Iterator<Item = &'a str>) -> HesmaResult<()> {
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(HesmaError::InvalidMetadata {
                what: format!("duplicate model name '{}'", name),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hm_schema::ARB_UNIT_STRING;
    use serde_json::json;

    fn hydro_table(name: Option<&str>) -> Table {
        let table = Table::new()
            .with_floats("radius", vec![1.0, 2.0])
            .unwrap()
            .with_floats("density", vec![2.0, 1.0])
            .unwrap()
            .with_floats("time", vec![0.0, 0.0])
            .unwrap();
        match name {
            Some(name) => {
                let mut table = table;
                table.set_name(name);
                table
            }
            None => table,
        }
    }

    fn build(
        source: DataSource,
        metadata: &WriteMetadata,
        options: &WriteOptions,
    ) -> HesmaResult<Vec<ModelEntity>> {
        build_entities(source, Category::Hydro1D, metadata, options)
    }

    #[test]
    fn rendered_document_is_stamped() {
        let entities = build(
            DataSource::Tables(vec![hydro_table(Some("m"))]),
            &WriteMetadata::default(),
            &WriteOptions::default(),
        )
        .unwrap();
        let text = render_document(&entities, None).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["m"]["schema"], json!(SCHEMA_URL));
        assert_eq!(value["m"]["units"]["pressure"], json!(ARB_UNIT_STRING));
        assert_eq!(value["m"]["data"][0], json!({"radius": 1.0, "density": 2.0, "time": 0.0}));
    }

    #[test]
    fn auto_name_fills_missing_names() {
        let options = WriteOptions {
            auto_name: true,
            ..WriteOptions::default()
        };
        let entities = build(
            DataSource::Tables(vec![hydro_table(None), hydro_table(Some("named"))]),
            &WriteMetadata::default(),
            &options,
        )
        .unwrap();
        let names: Vec<&str> = entities.iter().map(ModelEntity::name).collect();
        assert_eq!(names, ["model_0", "named"]);

        assert!(matches!(
            build(
                DataSource::Tables(vec![hydro_table(None)]),
                &WriteMetadata::default(),
                &WriteOptions::default()
            ),
            Err(HesmaError::Shape(ShapeError::MissingModelName { .. }))
        ));
    }

    #[test]
    fn model_name_count_must_match() {
        let metadata = WriteMetadata {
            model_names: Some(vec!["a".to_string()]),
            ..WriteMetadata::default()
        };
        assert!(matches!(
            build(
                DataSource::Tables(vec![hydro_table(None), hydro_table(None)]),
                &metadata,
                &WriteOptions::default()
            ),
            Err(HesmaError::InvalidMetadata { .. })
        ));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let entities = build(
            DataSource::Tables(vec![hydro_table(Some("m")), hydro_table(Some("m"))]),
            &WriteMetadata::default(),
            &WriteOptions::default(),
        )
        .unwrap();
        assert!(matches!(
            render_document(&entities, None),
            Err(HesmaError::InvalidMetadata { .. })
        ));
    }

    #[test]
    fn empty_sources_are_rejected() {
        let metadata = WriteMetadata {
            sources: vec![Source::default()],
            ..WriteMetadata::named("m")
        };
        assert!(matches!(
            build(
                DataSource::Tables(vec![hydro_table(None)]),
                &metadata,
                &WriteOptions::default()
            ),
            Err(HesmaError::InvalidMetadata { .. })
        ));
    }

    #[test]
    fn timesteps_need_spectrum_category() {
        let step = Table::new()
            .with_floats("time", vec![1.0])
            .unwrap()
            .with_floats("wavelength", vec![1.0])
            .unwrap()
            .with_floats("flux", vec![1.0])
            .unwrap();
        assert!(matches!(
            build(
                DataSource::Timesteps(vec![step]),
                &WriteMetadata::named("s"),
                &WriteOptions::default()
            ),
            Err(HesmaError::CategoryMismatch { .. })
        ));
    }
}
