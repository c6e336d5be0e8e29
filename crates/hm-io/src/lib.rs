//! hm-io: reading, writing and merging HESMA model files.

pub mod merge;
pub mod reader;
pub mod writer;

pub use merge::{merge_spectra, merge_spectra_nested, partition_by_model, sort_lightcurve_samples};
pub use reader::{list_models, read, read_all, read_all_str, read_str};
pub use writer::{
    DataSource, WriteMetadata, WriteOptions, render_document, write, write_entities,
    write_from_arrays, write_from_mapping, write_from_table,
};

use std::path::PathBuf;

use hm_core::ShapeError;
use hm_model::ModelError;
use hm_schema::{Category, ValidationError};

pub type HesmaResult<T> = Result<T, HesmaError>;

#[derive(thiserror::Error, Debug)]
pub enum HesmaError {
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Shape error: {0}")]
    Shape(#[from] ShapeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File {} already exists", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("Invalid metadata: {what}")]
    InvalidMetadata { what: String },

    #[error("Expected a {expected} model, got {actual}")]
    CategoryMismatch { expected: Category, actual: Category },

    #[error("Non-finite value for '{field}' in row {row}: {value}")]
    NonFinite { field: String, row: usize, value: f64 },

    #[error("Cannot tell which radiative-transfer product '{model}' holds")]
    UnknownRtProduct { model: String },
}

impl From<ModelError> for HesmaError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Validation(e) => HesmaError::Validation(e),
            ModelError::Shape(e) => HesmaError::Shape(e),
            ModelError::NonFinite { field, row, value } => {
                HesmaError::NonFinite { field, row, value }
            }
            ModelError::CategoryMismatch { expected, actual } => {
                HesmaError::CategoryMismatch { expected, actual }
            }
            ModelError::UnknownRtProduct { model } => HesmaError::UnknownRtProduct { model },
            ModelError::Json(e) => HesmaError::Decode(e),
        }
    }
}
