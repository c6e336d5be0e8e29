//! hm-core: shared foundation for the HESMA model tooling.
//!
//! Contains:
//! - table (column-oriented `Table`, the analysis-facing shape)
//! - numeric (Real + tolerances + missing-aware comparisons)
//! - error (shape errors shared by every input adapter)

pub mod error;
pub mod numeric;
pub mod table;

// Re-exports: nice ergonomics for downstream crates
pub use error::{ShapeError, ShapeResult};
pub use numeric::*;
pub use table::{Column, ColumnData, Table};
