//! hm-model: validated in-memory HESMA models and their tabular form.
//!
//! Every construction path (table, mapping, named arrays, decoded
//! document) is funneled into one model entry and checked by
//! [`hm_schema::validate_entry`] before an entity exists.

pub mod adapter;
pub mod entity;
pub mod hydro1d;
pub mod lightcurve;
pub(crate) mod mapping;
pub mod metadata;
pub mod spectrum;

pub use adapter::{FieldArray, points_from_table, table_from_arrays, table_from_columns};
pub use entity::{ModelEntity, entry_value};
pub use hydro1d::Hydro1D;
pub use lightcurve::Lightcurve;
pub use metadata::Metadata;
pub use spectrum::{
    SpectrumSeries, TIMESTEP_COLUMN, spectrum_points_from_table, timestep_record,
};

use hm_core::ShapeError;
use hm_schema::{Category, ValidationError};

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Shape error: {0}")]
    Shape(#[from] ShapeError),

    #[error("Non-finite value for '{field}' in row {row}: {value}")]
    NonFinite { field: String, row: usize, value: f64 },

    #[error("Expected a {expected} model, got {actual}")]
    CategoryMismatch { expected: Category, actual: Category },

    #[error("Cannot tell which radiative-transfer product '{model}' holds")]
    UnknownRtProduct { model: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
