//! Tabular adapter: tables, column mappings and named arrays in, point
//! objects out.

use hm_core::{ColumnData, Real, ShapeError, ShapeResult, Table};
use serde_json::{Map, Number, Value};

use crate::{ModelError, ModelResult};

/// One input array with the field it holds.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldArray {
    pub name: Option<String>,
    pub values: ColumnData,
}

impl FieldArray {
    pub fn new(name: impl Into<String>, values: Vec<Real>) -> Self {
        Self {
            name: Some(name.into()),
            values: ColumnData::Float(values),
        }
    }

    pub fn text<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: Some(name.into()),
            values: ColumnData::Text(values.into_iter().map(|s| Some(s.into())).collect()),
        }
    }

    pub fn unnamed(values: Vec<Real>) -> Self {
        Self {
            name: None,
            values: ColumnData::Float(values),
        }
    }
}

/// Named arrays to a table. Every array needs a non-empty name and all
/// arrays must share one length.
pub fn table_from_arrays<I>(arrays: I) -> ShapeResult<Table>
where
    I: IntoIterator<Item = FieldArray>,
{
    let mut table = Table::new();
    for (position, array) in arrays.into_iter().enumerate() {
        match array.name {
            Some(name) if !name.is_empty() => table.push_column(name, array.values)?,
            _ => return Err(ShapeError::UnnamedField { position }),
        }
    }
    Ok(table)
}

/// Column mapping (`{"radius": [..], "density": [..]}`) to a table.
///
/// Arrays must share one length. A scalar is repeated for every row, so a
/// single snapshot time can be given once. `null` array elements become
/// missing cells.
pub fn table_from_columns(columns: &Map<String, Value>) -> ModelResult<Table> {
    let rows = columns
        .values()
        .find_map(|v| v.as_array().map(Vec::len))
        .unwrap_or(1);

    let mut table = Table::new();
    for (name, value) in columns {
        let data = match value {
            Value::Array(items) => {
                if items.len() != rows {
                    return Err(ShapeError::LengthMismatch {
                        field: name.clone(),
                        expected: rows,
                        actual: items.len(),
                    }
                    .into());
                }
                column_from_values(name, items)?
            }
            scalar => column_from_values(name, &vec![scalar.clone(); rows])?,
        };
        table.push_column(name.clone(), data)?;
    }
    Ok(table)
}

fn column_from_values(name: &str, items: &[Value]) -> ShapeResult<ColumnData> {
    let is_text = items.iter().find(|v| !v.is_null()).is_some_and(Value::is_string);
    if is_text {
        items
            .iter()
            .map(|v| match v {
                Value::String(s) => Ok(Some(s.clone())),
                Value::Null => Ok(None),
                _ => Err(wrong_column_type(name, "text")),
            })
            .collect::<ShapeResult<Vec<_>>>()
            .map(ColumnData::Text)
    } else {
        items
            .iter()
            .map(|v| match v {
                Value::Number(n) => n.as_f64().ok_or_else(|| wrong_column_type(name, "float")),
                Value::Null => Ok(Real::NAN),
                _ => Err(wrong_column_type(name, "float")),
            })
            .collect::<ShapeResult<Vec<_>>>()
            .map(ColumnData::Float)
    }
}

fn wrong_column_type(name: &str, expected: &'static str) -> ShapeError {
    ShapeError::WrongColumnType {
        name: name.to_string(),
        expected,
    }
}

/// One point object per table row, holding only the row's present cells.
pub fn points_from_table(table: &Table) -> ModelResult<Vec<Value>> {
    (0..table.num_rows())
        .map(|row| {
            let mut point = Map::new();
            for column in table.columns() {
                if let Some(value) = cell_value(&column.name, &column.data, row)? {
                    point.insert(column.name.clone(), value);
                }
            }
            Ok(Value::Object(point))
        })
        .collect()
}

/// JSON value of one cell; `None` for a missing cell.
pub(crate) fn cell_value(name: &str, data: &ColumnData, row: usize) -> ModelResult<Option<Value>> {
    match data {
        ColumnData::Float(values) => match values.get(row) {
            Some(v) if v.is_nan() => Ok(None),
            Some(&v) => Number::from_f64(v)
                .map(|n| Some(Value::Number(n)))
                .ok_or_else(|| ModelError::NonFinite {
                    field: name.to_string(),
                    row,
                    value: v,
                }),
            None => Ok(None),
        },
        ColumnData::Text(values) => Ok(values.get(row).cloned().flatten().map(Value::String)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn arrays_need_names() {
        let err = table_from_arrays([
            FieldArray::new("radius", vec![1.0, 2.0]),
            FieldArray::unnamed(vec![1.0, 2.0]),
        ])
        .unwrap_err();
        assert_eq!(err, ShapeError::UnnamedField { position: 1 });

        let mut blank = FieldArray::new("", vec![1.0]);
        blank.name = Some(String::new());
        assert!(matches!(
            table_from_arrays([blank]),
            Err(ShapeError::UnnamedField { position: 0 })
        ));
    }

    #[test]
    fn arrays_need_equal_lengths() {
        let err = table_from_arrays([
            FieldArray::new("radius", vec![1.0, 2.0, 3.0]),
            FieldArray::new("density", vec![1.0, 2.0]),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ShapeError::LengthMismatch { ref field, expected: 3, actual: 2 } if field == "density"
        ));
    }

    #[test]
    fn columns_broadcast_scalars_and_map_nulls() {
        let columns =
            json!({"radius": [1, 2], "time": 5.0, "xHe": [0.5, null], "band": ["B", "V"]});
        let table = table_from_columns(columns.as_object().unwrap()).unwrap();
        assert_eq!(table.floats("time").unwrap(), &[5.0, 5.0]);
        assert!(table.floats("xHe").unwrap()[1].is_nan());
        assert_eq!(
            table.texts("band").unwrap(),
            &[Some("B".to_string()), Some("V".to_string())]
        );
    }

    #[test]
    fn columns_length_mismatch() {
        let columns = json!({"radius": [1, 2, 3], "density": [1, 2]});
        let err = table_from_columns(columns.as_object().unwrap()).unwrap_err();
        assert!(matches!(
            err,
            ModelError::Shape(ShapeError::LengthMismatch { expected: 3, actual: 2, .. })
        ));
    }

    #[test]
    fn mixed_column_is_rejected() {
        let columns = json!({"radius": [1, "two"]});
        assert!(matches!(
            table_from_columns(columns.as_object().unwrap()),
            Err(ModelError::Shape(ShapeError::WrongColumnType { .. }))
        ));
    }

    #[test]
    fn points_skip_missing_cells() {
        let table = Table::new()
            .with_floats("radius", vec![1.0, 2.0])
            .unwrap()
            .with_floats("pressure", vec![f64::NAN, 3.0])
            .unwrap();
        let points = points_from_table(&table).unwrap();
        assert_eq!(points, vec![json!({"radius": 1.0}), json!({"radius": 2.0, "pressure": 3.0})]);
    }

    #[test]
    fn infinite_values_are_rejected() {
        let table = Table::new()
            .with_floats("radius", vec![1.0, f64::INFINITY])
            .unwrap();
        assert!(matches!(
            points_from_table(&table),
            Err(ModelError::NonFinite { row: 1, .. })
        ));
    }
}
