use thiserror::Error;

pub type ShapeResult<T> = Result<T, ShapeError>;

/// Errors raised when input data cannot be arranged into model points.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    #[error("Length mismatch for field '{field}': expected {expected} values, got {actual}")]
    LengthMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("Unnamed field at position {position}: every array must carry a field name")]
    UnnamedField { position: usize },

    #[error("Shape ambiguity: {items} inputs cannot be split evenly into {num_models} models")]
    ShapeAmbiguity { items: usize, num_models: usize },

    #[error("Missing model name: {context}")]
    MissingModelName { context: String },

    #[error("Duplicate column: {name}")]
    DuplicateColumn { name: String },

    #[error("Missing column '{name}' in {context}")]
    MissingColumn { name: String, context: String },

    #[error("Column '{name}' has the wrong type (expected {expected})")]
    WrongColumnType { name: String, expected: &'static str },

    #[error("Column 'time' of table {table_index} is not constant")]
    TimeNotConstant { table_index: usize },
}
