//! The model entity and its construction paths.

use hm_core::{ShapeError, Table};
use hm_schema::{Category, ModelHeader, Units, validate_entry};
use serde_json::{Map, Value};

use crate::adapter::{points_from_table, table_from_arrays, table_from_columns};
use crate::hydro1d::Hydro1D;
use crate::lightcurve::Lightcurve;
use crate::mapping::{MappingShape, classify, strip_nulls};
use crate::metadata::Metadata;
use crate::spectrum::{SpectrumSeries, spectrum_points_from_table};
use crate::{FieldArray, ModelError, ModelResult};

/// A validated model of one category.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEntity {
    Hydro1D(Hydro1D),
    Lightcurve(Lightcurve),
    Spectrum(SpectrumSeries),
}

impl ModelEntity {
    /// Build an entity from a raw model entry stored under `key`.
    ///
    /// Every other constructor ends here. The entry is validated for
    /// `category` before anything is built. A generic radiative-transfer
    /// entry is validated once generically, then again as the product its
    /// fields identify.
    pub fn from_entry(category: Category, key: &str, entry: &Value) -> ModelResult<Self> {
        validate_entry(key, entry, category)?;
        let category = match category {
            Category::RtGeneric => {
                let concrete = rt_product_of_entry(key, entry)?;
                validate_entry(key, entry, concrete)?;
                concrete
            }
            other => other,
        };

        let entry = strip_nulls(entry.clone());
        let entity = match category {
            Category::Hydro1D => {
                ModelEntity::Hydro1D(Hydro1D::from_entry(serde_json::from_value(entry)?))
            }
            Category::Lightcurve => {
                ModelEntity::Lightcurve(Lightcurve::from_entry(serde_json::from_value(entry)?))
            }
            Category::Spectrum | Category::RtGeneric => {
                ModelEntity::Spectrum(SpectrumSeries::from_entry(serde_json::from_value(entry)?))
            }
        };
        Ok(entity)
    }

    /// Build from a table: one row per point (Hydro1D, Lightcurve) or one
    /// row per wavelength bin (Spectrum, long format). The model name comes
    /// from `metadata`, else from the table's name.
    pub fn from_table(category: Category, table: &Table, metadata: &Metadata) -> ModelResult<Self> {
        let header = metadata.header(table.name(), "no model name given and the table is unnamed")?;
        let category = match category {
            Category::RtGeneric => rt_product_of_table(table, &header.name)?,
            other => other,
        };
        let data = match category {
            Category::Spectrum => spectrum_points_from_table(table)?,
            _ => points_from_table(table)?,
        };
        let entry = entry_value(&header, data)?;
        Self::from_entry(category, &header.name, &entry)
    }

    /// Build from a mapping: either a model entry (`{"name", "data", ..}`)
    /// or field name to column values, each optionally wrapped under a
    /// single model-name key.
    pub fn from_mapping(
        category: Category,
        mapping: &Map<String, Value>,
        metadata: &Metadata,
    ) -> ModelResult<Self> {
        match classify(mapping) {
            MappingShape::Entry { key, entry } => {
                let mut entry = entry.clone();
                metadata.apply_to_entry(&mut entry)?;
                let name = key
                    .or_else(|| entry.get("name").and_then(Value::as_str))
                    .map(str::to_string);
                let name = metadata.model_name.clone().or(name).ok_or_else(|| {
                    ShapeError::MissingModelName {
                        context: "mapping carries no model name".to_string(),
                    }
                })?;
                entry
                    .entry("name".to_string())
                    .or_insert_with(|| Value::String(name.clone()));
                Self::from_entry(category, &name, &Value::Object(entry))
            }
            MappingShape::Columns { key, columns } => {
                let mut table = table_from_columns(columns)?;
                if let Some(key) = key {
                    table.set_name(key);
                }
                Self::from_table(category, &table, metadata)
            }
        }
    }

    /// Build from named arrays. The model name must come from `metadata`.
    pub fn from_arrays<I>(category: Category, arrays: I, metadata: &Metadata) -> ModelResult<Self>
    where
        I: IntoIterator<Item = FieldArray>,
    {
        let table = table_from_arrays(arrays)?;
        Self::from_table(category, &table, metadata)
    }

    /// Attach a lightcurve derived-quantity table (one row per band and
    /// viewing angle). The result is validated again.
    pub fn with_derived_table(self, derived: &Table) -> ModelResult<Self> {
        if self.category() != Category::Lightcurve {
            return Err(ModelError::CategoryMismatch {
                expected: Category::Lightcurve,
                actual: self.category(),
            });
        }
        let mut entry = self.to_entry_value()?;
        if let Value::Object(map) = &mut entry {
            map.insert(
                "derived_data".to_string(),
                Value::Array(points_from_table(derived)?),
            );
        }
        Self::from_entry(Category::Lightcurve, self.name(), &entry)
    }

    pub fn category(&self) -> Category {
        match self {
            ModelEntity::Hydro1D(_) => Category::Hydro1D,
            ModelEntity::Lightcurve(_) => Category::Lightcurve,
            ModelEntity::Spectrum(_) => Category::Spectrum,
        }
    }

    pub fn name(&self) -> &str {
        &self.header().name
    }

    pub fn header(&self) -> &ModelHeader {
        match self {
            ModelEntity::Hydro1D(m) => m.header(),
            ModelEntity::Lightcurve(m) => m.header(),
            ModelEntity::Spectrum(m) => m.header(),
        }
    }

    /// Header access for renaming and annotating. None of the header
    /// fields affect the validity of the data.
    pub fn header_mut(&mut self) -> &mut ModelHeader {
        match self {
            ModelEntity::Hydro1D(m) => m.header_mut(),
            ModelEntity::Lightcurve(m) => m.header_mut(),
            ModelEntity::Spectrum(m) => m.header_mut(),
        }
    }

    pub fn to_table(&self) -> Table {
        match self {
            ModelEntity::Hydro1D(m) => m.to_table(),
            ModelEntity::Lightcurve(m) => m.to_table(),
            ModelEntity::Spectrum(m) => m.to_table(),
        }
    }

    /// Units with defaults filled in for every recognized field.
    pub fn units(&self) -> Units {
        match self {
            ModelEntity::Hydro1D(m) => m.units(),
            ModelEntity::Lightcurve(m) => m.units(),
            ModelEntity::Spectrum(m) => m.units(),
        }
    }

    /// The model entry as it is stored in a document.
    pub fn to_entry_value(&self) -> ModelResult<Value> {
        let value = match self {
            ModelEntity::Hydro1D(m) => serde_json::to_value(m.entry())?,
            ModelEntity::Lightcurve(m) => serde_json::to_value(m.entry())?,
            ModelEntity::Spectrum(m) => serde_json::to_value(m.entry())?,
        };
        Ok(value)
    }

    pub fn as_hydro1d(&self) -> Option<&Hydro1D> {
        match self {
            ModelEntity::Hydro1D(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_lightcurve(&self) -> Option<&Lightcurve> {
        match self {
            ModelEntity::Lightcurve(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_spectrum(&self) -> Option<&SpectrumSeries> {
        match self {
            ModelEntity::Spectrum(m) => Some(m),
            _ => None,
        }
    }
}

/// A model entry holding `header` and the given data points.
pub fn entry_value(header: &ModelHeader, data: Vec<Value>) -> ModelResult<Value> {
    let mut entry = match serde_json::to_value(header)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    entry.insert("data".to_string(), Value::Array(data));
    Ok(Value::Object(entry))
}

fn rt_product_of_entry(key: &str, entry: &Value) -> ModelResult<Category> {
    let points = entry
        .get("data")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let has = |field: &str| points.iter().any(|p| p.get(field).is_some());
    rt_product(has("wavelength"), has("band"), key)
}

fn rt_product_of_table(table: &Table, name: &str) -> ModelResult<Category> {
    rt_product(table.has_column("wavelength"), table.has_column("band"), name)
}

fn rt_product(has_wavelength: bool, has_band: bool, model: &str) -> ModelResult<Category> {
    match (has_wavelength, has_band) {
        (true, false) => Ok(Category::Spectrum),
        (false, true) => Ok(Category::Lightcurve),
        _ => Err(ModelError::UnknownRtProduct {
            model: model.to_string(),
        }),
    }
}
