//! Spectral time series.
//!
//! In tabular form a series is "long": one row per wavelength bin, with the
//! timestep's `time` and position repeated on each row. Per-timestep tables
//! carry the same columns for a single timestep.

use hm_core::{
    ColumnData, Real, ShapeError, ShapeResult, Table, Tolerances, nearly_equal, same_value,
};
use hm_schema::{Category, ModelHeader, SpectrumEntry, SpectrumRecord, Units, complete_units};
use serde_json::{Map, Number, Value};

use crate::adapter::cell_value;
use crate::{ModelError, ModelResult};

/// Long-format column holding each row's timestep position.
pub const TIMESTEP_COLUMN: &str = "timestep";

#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumSeries {
    entry: SpectrumEntry,
}

impl SpectrumSeries {
    pub(crate) fn from_entry(entry: SpectrumEntry) -> Self {
        Self { entry }
    }

    pub fn entry(&self) -> &SpectrumEntry {
        &self.entry
    }

    pub fn into_entry(self) -> SpectrumEntry {
        self.entry
    }

    pub fn name(&self) -> &str {
        &self.entry.header.name
    }

    pub fn header(&self) -> &ModelHeader {
        &self.entry.header
    }

    pub(crate) fn header_mut(&mut self) -> &mut ModelHeader {
        &mut self.entry.header
    }

    /// Timesteps in document order.
    pub fn spectra(&self) -> &[SpectrumRecord] {
        &self.entry.data
    }

    pub fn len(&self) -> usize {
        self.entry.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entry.data.is_empty()
    }

    pub fn unique_times(&self) -> Vec<Real> {
        let mut times: Vec<Real> = self.entry.data.iter().map(|r| r.time).collect();
        times.sort_by(|a, b| a.total_cmp(b));
        times.dedup();
        times
    }

    /// Wavelength / flux (/ flux_err) table of the first timestep at `time`.
    pub fn spectrum_at(&self, time: Real) -> Option<Table> {
        let tol = Tolerances::default();
        self.entry
            .data
            .iter()
            .find(|r| nearly_equal(r.time, time, tol))
            .map(|r| record_table(self.name(), r, false))
    }

    /// One table per timestep, each with a constant `time` column.
    pub fn timestep_tables(&self) -> Vec<Table> {
        self.entry
            .data
            .iter()
            .map(|r| record_table(self.name(), r, true))
            .collect()
    }

    /// Long format: every timestep's bins stacked in document order.
    ///
    /// The [`TIMESTEP_COLUMN`] keeps the boundary between consecutive
    /// timesteps that share a time.
    pub fn to_table(&self) -> Table {
        let records = &self.entry.data;
        let has_err = records.iter().any(|r| r.flux_err.is_some());

        let mut step = Vec::new();
        let mut time = Vec::new();
        let mut wavelength = Vec::new();
        let mut flux = Vec::new();
        let mut flux_err = Vec::new();
        for (index, record) in records.iter().enumerate() {
            step.extend(std::iter::repeat_n(index as Real, record.len()));
            time.extend(std::iter::repeat_n(record.time, record.len()));
            wavelength.extend_from_slice(&record.wavelength);
            flux.extend_from_slice(&record.flux);
            match &record.flux_err {
                Some(err) => flux_err.extend_from_slice(err),
                None => flux_err.extend(std::iter::repeat_n(Real::NAN, record.len())),
            }
        }

        let mut table = Table::named(self.name());
        table.set_column("time", ColumnData::Float(time));
        table.set_column(TIMESTEP_COLUMN, ColumnData::Float(step));
        table.set_column("wavelength", ColumnData::Float(wavelength));
        table.set_column("flux", ColumnData::Float(flux));
        if has_err {
            table.set_column("flux_err", ColumnData::Float(flux_err));
        }
        table
    }

    pub fn units(&self) -> Units {
        complete_units::<&str>(Category::Spectrum, &self.entry.header.units, &[])
    }
}

fn record_table(name: &str, record: &SpectrumRecord, with_time: bool) -> Table {
    let mut table = Table::named(name);
    if with_time {
        table.set_column(
            "time",
            ColumnData::Float(vec![record.time; record.len()]),
        );
    }
    table.set_column("wavelength", ColumnData::Float(record.wavelength.clone()));
    table.set_column("flux", ColumnData::Float(record.flux.clone()));
    if let Some(err) = &record.flux_err {
        table.set_column("flux_err", ColumnData::Float(err.clone()));
    }
    table
}

/// Split a long-format table into one timestep record per run of rows.
///
/// A run is a block of consecutive rows with bit-identical `time` and,
/// when the table has a [`TIMESTEP_COLUMN`], the same position. Runs come
/// out stably sorted by time, so timesteps sharing a time keep their
/// order. Rows keep their order within a run. A column with no present
/// cell in a run is left out of that record, and a partially missing
/// column keeps `null` placeholders so validation reports it.
pub fn spectrum_points_from_table(table: &Table) -> ModelResult<Vec<Value>> {
    let times = time_column(table, "spectrum table")?;
    let steps = table.floats(TIMESTEP_COLUMN);
    let key = |row: usize| {
        let step = steps.and_then(|s| s.get(row)).map(|v| v.to_bits());
        (times[row].to_bits(), step)
    };

    let mut runs: Vec<(Real, Vec<usize>)> = Vec::new();
    for row in 0..times.len() {
        let same_run = row > 0 && key(row - 1) == key(row);
        match runs.last_mut() {
            Some((_, rows)) if same_run => rows.push(row),
            _ => runs.push((times[row], vec![row])),
        }
    }
    runs.sort_by(|a, b| a.0.total_cmp(&b.0));

    runs.into_iter()
        .map(|(time, rows)| record_value(table, time, &rows))
        .collect()
}

/// The single record held by a per-timestep table, with its time.
///
/// `table_index` is the table's position in the caller's input and is
/// only used for error reporting.
pub fn timestep_record(table: &Table, table_index: usize) -> ModelResult<(Real, Value)> {
    let context = format!("timestep table {}", table_index);
    let times = time_column(table, &context)?;
    let first = times.first().copied().ok_or_else(|| ShapeError::MissingColumn {
        name: "time".to_string(),
        context: format!("empty {}", context),
    })?;
    let tol = Tolerances::default();
    if !times.iter().all(|&t| same_value(t, first, tol)) {
        return Err(ShapeError::TimeNotConstant { table_index }.into());
    }
    let rows: Vec<usize> = (0..times.len()).collect();
    Ok((first, record_value(table, first, &rows)?))
}

fn time_column<'a>(table: &'a Table, context: &str) -> ShapeResult<&'a [Real]> {
    match table.column("time") {
        None => Err(ShapeError::MissingColumn {
            name: "time".to_string(),
            context: context.to_string(),
        }),
        Some(ColumnData::Float(values)) => Ok(values),
        Some(ColumnData::Text(_)) => Err(ShapeError::WrongColumnType {
            name: "time".to_string(),
            expected: "float",
        }),
    }
}

fn record_value(table: &Table, time: Real, rows: &[usize]) -> ModelResult<Value> {
    let mut record = Map::new();
    if !time.is_nan() {
        let t = Number::from_f64(time).ok_or_else(|| ModelError::NonFinite {
            field: "time".to_string(),
            row: rows.first().copied().unwrap_or(0),
            value: time,
        })?;
        record.insert("time".to_string(), Value::Number(t));
    }
    let columns = table
        .columns()
        .iter()
        .filter(|c| c.name != "time" && c.name != TIMESTEP_COLUMN);
    for column in columns {
        let cells = rows
            .iter()
            .map(|&row| cell_value(&column.name, &column.data, row))
            .collect::<ModelResult<Vec<_>>>()?;
        if cells.iter().all(Option::is_none) {
            continue;
        }
        let values = cells
            .into_iter()
            .map(|cell| cell.unwrap_or(Value::Null))
            .collect();
        record.insert(column.name.clone(), Value::Array(values));
    }
    Ok(Value::Object(record))
}
