use hm_core::{ColumnData, Table, Tolerances};
use hm_model::{FieldArray, Metadata, ModelEntity, ModelError};
use hm_schema::{Category, ValidationError};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

fn three_rows() -> Table {
    Table::named("m")
        .with_floats("radius", vec![1.0, 2.0, 3.0])
        .unwrap()
        .with_floats("density", vec![1.0, 2.0, 3.0])
        .unwrap()
        .with_floats("time", vec![1.0, 2.0, 3.0])
        .unwrap()
}

#[test]
fn three_column_table_keeps_exactly_its_columns() {
    let entity = ModelEntity::from_table(Category::Hydro1D, &three_rows(), &Metadata::default())
        .expect("valid table");
    assert_eq!(entity.name(), "m");

    let table = entity.to_table();
    let names: Vec<&str> = table.column_names().collect();
    assert_eq!(names, ["radius", "density", "time"]);
    for absent in ["pressure", "temperature", "mass", "velocity"] {
        assert!(table.column(absent).is_none(), "{absent}");
    }
    assert!(table.same_values(&three_rows(), Tolerances::default()));
}

#[test]
fn three_input_shapes_are_equivalent() {
    let metadata = Metadata::named("m");
    let from_table = ModelEntity::from_table(Category::Hydro1D, &three_rows(), &metadata).unwrap();

    let mapping = json!({"radius": [1, 2, 3], "density": [1, 2, 3], "time": [1, 2, 3]});
    let from_mapping =
        ModelEntity::from_mapping(Category::Hydro1D, mapping.as_object().unwrap(), &metadata)
            .unwrap();

    let from_arrays = ModelEntity::from_arrays(
        Category::Hydro1D,
        [
            FieldArray::new("radius", vec![1.0, 2.0, 3.0]),
            FieldArray::new("density", vec![1.0, 2.0, 3.0]),
            FieldArray::new("time", vec![1.0, 2.0, 3.0]),
        ],
        &metadata,
    )
    .unwrap();

    assert_eq!(from_table, from_mapping);
    assert_eq!(from_table, from_arrays);
}

#[test]
fn unnamed_table_without_metadata_has_no_name() {
    let mut table = Table::new();
    table.set_column("radius", ColumnData::Float(vec![1.0, 2.0]));
    table.set_column("density", ColumnData::Float(vec![1.0, 2.0]));
    table.set_column("time", ColumnData::Float(vec![0.0, 0.0]));
    let err = ModelEntity::from_table(Category::Hydro1D, &table, &Metadata::default()).unwrap_err();
    assert!(matches!(
        err,
        ModelError::Shape(hm_core::ShapeError::MissingModelName { .. })
    ));
}

#[test]
fn missing_required_cell_fails_validation() {
    let table = three_rows()
        .with_floats("pressure", vec![1.0, f64::NAN, 2.0])
        .unwrap();
    assert!(ModelEntity::from_table(Category::Hydro1D, &table, &Metadata::default()).is_ok());

    let mut broken = three_rows();
    broken.set_column("density", ColumnData::Float(vec![1.0, f64::NAN, 3.0]));
    let err =
        ModelEntity::from_table(Category::Hydro1D, &broken, &Metadata::default()).unwrap_err();
    assert!(matches!(
        err,
        ModelError::Validation(ValidationError::MissingRequiredField { ref field, ref context, .. })
            if field == "density" && context == "data[1]"
    ));
}

#[test]
fn unknown_column_is_rejected() {
    let table = three_rows().with_floats("entropy", vec![1.0, 2.0, 3.0]).unwrap();
    assert!(matches!(
        ModelEntity::from_table(Category::Hydro1D, &table, &Metadata::default()),
        Err(ModelError::Validation(ValidationError::InvalidFieldName { .. }))
    ));
}

#[test]
fn lightcurve_table_with_derived_quantities() {
    let table = Table::named("lc")
        .with_floats("time", vec![0.0, 1.0])
        .unwrap()
        .with_texts("band", ["B", "B"])
        .unwrap()
        .with_floats("magnitude", vec![-18.0, -19.0])
        .unwrap()
        .with_floats("e_magnitude", vec![0.1, 0.1])
        .unwrap()
        .with_floats("viewing_angle", vec![-1.0, -1.0])
        .unwrap();
    let derived = Table::new()
        .with_texts("band", ["B"])
        .unwrap()
        .with_floats("viewing_angle", vec![-1.0])
        .unwrap()
        .with_floats("peak_mag", vec![-19.0])
        .unwrap();

    let entity = ModelEntity::from_table(Category::Lightcurve, &table, &Metadata::default())
        .and_then(|e| e.with_derived_table(&derived))
        .unwrap();
    let lc = entity.as_lightcurve().unwrap();
    assert_eq!(lc.derived_for("B", -1.0).and_then(|d| d.peak_mag), Some(-19.0));
    assert!(entity.to_table().same_values(&table, Tolerances::default()));
}

#[test]
fn spectrum_from_long_table() {
    let table = Table::named("sn")
        .with_floats("time", vec![2.0, 2.0, 1.0, 1.0])
        .unwrap()
        .with_floats("wavelength", vec![4000.0, 5000.0, 4000.0, 5000.0])
        .unwrap()
        .with_floats("flux", vec![1.0, 2.0, 3.0, 4.0])
        .unwrap();
    let entity = ModelEntity::from_table(Category::Spectrum, &table, &Metadata::default()).unwrap();
    let series = entity.as_spectrum().unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series.spectra()[0].time, 1.0);
    assert_eq!(series.spectra()[0].flux, [3.0, 4.0]);
}

#[test]
fn mapping_with_inconsistent_lengths() {
    let mapping = json!({"radius": [1, 2, 3], "density": [1, 2], "time": [0, 0, 0]});
    let err = ModelEntity::from_mapping(
        Category::Hydro1D,
        mapping.as_object().unwrap(),
        &Metadata::named("m"),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ModelError::Shape(hm_core::ShapeError::LengthMismatch { .. })
    ));
}

fn hydro_table() -> impl Strategy<Value = Table> {
    (2usize..12).prop_flat_map(|rows| {
        (
            prop::collection::vec(1e-3f64..1e12, rows),
            prop::collection::vec(1e-12f64..1e3, rows),
            prop::collection::vec(0.0f64..1e4, rows),
            prop::collection::vec(prop::option::of(0.0f64..1.0), rows),
        )
            .prop_map(|(radius, density, time, ni)| {
                let mut ni: Vec<f64> = ni.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
                // keep the column observable on at least one point
                ni[0] = 0.5;
                Table::named("p")
                    .with_floats("radius", radius)
                    .unwrap()
                    .with_floats("density", density)
                    .unwrap()
                    .with_floats("time", time)
                    .unwrap()
                    .with_floats("xNi56", ni)
                    .unwrap()
            })
    })
}

proptest! {
    #[test]
    fn hydro_table_survives_entity(table in hydro_table()) {
        let entity = ModelEntity::from_table(Category::Hydro1D, &table, &Metadata::default())
            .unwrap();
        prop_assert!(entity.to_table().identical(&table));
    }

    #[test]
    fn hydro_entry_value_rebuilds_same_entity(table in hydro_table()) {
        let entity = ModelEntity::from_table(Category::Hydro1D, &table, &Metadata::default())
            .unwrap();
        let entry = entity.to_entry_value().unwrap();
        let rebuilt = ModelEntity::from_entry(Category::Hydro1D, "p", &entry).unwrap();
        prop_assert_eq!(rebuilt, entity);
    }
}
