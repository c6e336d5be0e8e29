//! hm-schema: canonical HESMA document format and validation.

pub mod category;
pub mod document;
pub mod field;
pub mod schema;
pub mod units;
pub mod validate;

pub use category::{Category, CategoryRules, ExtraFields, FieldKind, FieldRule};
pub use document::Document;
pub use field::{HydroField, Species, UnknownField, is_abundance_name};
pub use schema::*;
pub use units::{ARB_UNIT_STRING, complete_units};
pub use validate::{ValidationError, ValidationResult, validate, validate_entry};

/// Provenance URL stamped into the `schema` field of written models.
pub const SCHEMA_URL: &str = "https://github.com/AlexHls/hesmapy/blob/v0.1.0/SCHEMA.md";

/// Viewing-angle sentinel for angle-averaged lightcurves.
pub const VIEWING_ANGLE_AVERAGED: f64 = -1.0;
