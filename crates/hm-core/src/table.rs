//! Column-oriented table: one row per point, one column per field.
//!
//! Missing values are represented in-band: `NaN` in float columns and
//! `None` in text columns. A table never fabricates values for fields a
//! point did not carry.

use crate::error::{ShapeError, ShapeResult};
use crate::numeric::{Real, Tolerances, is_missing, same_value};

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Float(Vec<Real>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Float(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ColumnData::Float(_) => "float",
            ColumnData::Text(_) => "text",
        }
    }

    pub fn select(&self, rows: &[usize]) -> ColumnData {
        match self {
            ColumnData::Float(v) => ColumnData::Float(
                rows.iter()
                    .map(|&r| v.get(r).copied().unwrap_or(Real::NAN))
                    .collect(),
            ),
            ColumnData::Text(v) => {
                ColumnData::Text(rows.iter().map(|&r| v.get(r).cloned().flatten()).collect())
            }
        }
    }

    /// Pad with missing values or truncate to `len` rows.
    pub fn resize(&mut self, len: usize) {
        match self {
            ColumnData::Float(v) => v.resize(len, Real::NAN),
            ColumnData::Text(v) => v.resize(len, None),
        }
    }

    pub fn same_values(&self, other: &ColumnData, tol: Tolerances) -> bool {
        match (self, other) {
            (ColumnData::Float(a), ColumnData::Float(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| same_value(*x, *y, tol))
            }
            (ColumnData::Text(a), ColumnData::Text(b)) => a == b,
            _ => false,
        }
    }

    /// Exact comparison: floats must match bit for bit, except that any
    /// two missing cells are equal.
    pub fn identical(&self, other: &ColumnData) -> bool {
        match (self, other) {
            (ColumnData::Float(a), ColumnData::Float(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| {
                        (is_missing(*x) && is_missing(*y)) || x.to_bits() == y.to_bits()
                    })
            }
            (ColumnData::Text(a), ColumnData::Text(b)) => a == b,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

/// Named-column table with an optional table name.
///
/// The table name is how a caller attaches a model name to tabular input
/// (the writer infers the model name from it when none is given).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    name: Option<String>,
    columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            columns: Vec::new(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.data.len())
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.columns.iter().find(|c| c.name == name).map(|c| &c.data)
    }

    pub fn floats(&self, name: &str) -> Option<&[Real]> {
        match self.column(name)? {
            ColumnData::Float(v) => Some(v),
            ColumnData::Text(_) => None,
        }
    }

    pub fn texts(&self, name: &str) -> Option<&[Option<String>]> {
        match self.column(name)? {
            ColumnData::Text(v) => Some(v),
            ColumnData::Float(_) => None,
        }
    }

    /// Append a column. The first column fixes the row count.
    pub fn push_column(&mut self, name: impl Into<String>, data: ColumnData) -> ShapeResult<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(ShapeError::UnnamedField {
                position: self.columns.len(),
            });
        }
        if self.has_column(&name) {
            return Err(ShapeError::DuplicateColumn { name });
        }
        if let Some(first) = self.columns.first()
            && first.data.len() != data.len()
        {
            return Err(ShapeError::LengthMismatch {
                field: name,
                expected: first.data.len(),
                actual: data.len(),
            });
        }
        self.columns.push(Column { name, data });
        Ok(())
    }

    /// Insert or replace a column, fitting it to the current row count.
    ///
    /// Unlike [`Table::push_column`] this never fails: short data is padded
    /// with missing values and long data is truncated. An empty table takes
    /// its row count from the first column.
    pub fn set_column(&mut self, name: impl Into<String>, mut data: ColumnData) {
        let name = name.into();
        if let Some(existing) = self.columns.iter_mut().find(|c| c.name == name) {
            data.resize(existing.data.len());
            existing.data = data;
            return;
        }
        if !self.columns.is_empty() {
            data.resize(self.num_rows());
        }
        self.columns.push(Column { name, data });
    }

    pub fn with_floats(mut self, name: impl Into<String>, values: Vec<Real>) -> ShapeResult<Self> {
        self.push_column(name, ColumnData::Float(values))?;
        Ok(self)
    }

    pub fn with_texts<I, S>(mut self, name: impl Into<String>, values: I) -> ShapeResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(|s| Some(s.into())).collect();
        self.push_column(name, ColumnData::Text(values))?;
        Ok(self)
    }

    /// New table holding the given rows, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Table {
        Table {
            name: self.name.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    data: c.data.select(rows),
                })
                .collect(),
        }
    }

    /// Column-wise comparison that ignores column order and treats two
    /// missing cells as equal.
    pub fn same_values(&self, other: &Table, tol: Tolerances) -> bool {
        self.num_columns() == other.num_columns()
            && self.columns.iter().all(|c| {
                other
                    .column(&c.name)
                    .is_some_and(|o| c.data.same_values(o, tol))
            })
    }

    /// [`Table::same_values`] without tolerance, see [`ColumnData::identical`].
    pub fn identical(&self, other: &Table) -> bool {
        self.num_columns() == other.num_columns()
            && self
                .columns
                .iter()
                .all(|c| other.column(&c.name).is_some_and(|o| c.data.identical(o)))
    }
}
