//! Multi-model merging for spectral time series and lightcurves.
//!
//! A flat list of per-timestep spectrum tables cannot say on its own which
//! model each table belongs to: "K spectra of one model" and "one spectrum
//! each of K models" look the same. The caller states the model count and
//! the list is split into equal, contiguous groups in input order. A count
//! that does not divide the list is an error.

use hm_core::{Real, ShapeError, ShapeResult, Table};
use hm_model::{ModelEntity, timestep_record};
use serde_json::Value;
use tracing::debug;

use crate::HesmaResult;

/// Split `items` into `num_models` contiguous groups of equal size.
pub fn partition_by_model<T>(items: Vec<T>, num_models: usize) -> ShapeResult<Vec<Vec<T>>> {
    let total = items.len();
    if num_models == 0 || total % num_models != 0 {
        return Err(ShapeError::ShapeAmbiguity {
            items: total,
            num_models,
        });
    }
    let per_model = total / num_models;
    let mut groups = Vec::with_capacity(num_models);
    let mut items = items.into_iter();
    for _ in 0..num_models {
        groups.push(items.by_ref().take(per_model).collect());
    }
    Ok(groups)
}

/// Per-model spectrum `data` arrays from a flat list of per-timestep
/// tables. Within a model, timesteps are ordered by time; equal times keep
/// their input order.
pub fn merge_spectra(tables: &[Table], num_models: usize) -> HesmaResult<Vec<Vec<Value>>> {
    let indexed: Vec<(usize, &Table)> = tables.iter().enumerate().collect();
    let groups = partition_by_model(indexed, num_models)?;
    debug!(
        tables = tables.len(),
        num_models,
        per_model = tables.len() / num_models,
        "partitioned spectrum tables"
    );
    groups.into_iter().map(|group| model_records(&group)).collect()
}

/// Like [`merge_spectra`], with the partition given by nesting: one inner
/// list of per-timestep tables per model.
pub fn merge_spectra_nested(
    models: &[Vec<Table>],
    num_models: usize,
) -> HesmaResult<Vec<Vec<Value>>> {
    if models.len() != num_models {
        return Err(ShapeError::ShapeAmbiguity {
            items: models.len(),
            num_models,
        }
        .into());
    }
    let mut offset = 0;
    let mut merged = Vec::with_capacity(models.len());
    for tables in models {
        let group: Vec<(usize, &Table)> = tables
            .iter()
            .enumerate()
            .map(|(i, t)| (offset + i, t))
            .collect();
        offset += tables.len();
        merged.push(model_records(&group)?);
    }
    Ok(merged)
}

fn model_records(group: &[(usize, &Table)]) -> HesmaResult<Vec<Value>> {
    let mut records: Vec<(Real, Value)> = group
        .iter()
        .map(|&(index, table)| timestep_record(table, index))
        .collect::<Result<_, _>>()?;
    records.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(records.into_iter().map(|(_, record)| record).collect())
}

/// Order lightcurve samples by band, viewing angle and time. Other
/// categories are left alone.
pub fn sort_lightcurve_samples(entity: &mut ModelEntity) {
    if let ModelEntity::Lightcurve(lightcurve) = entity {
        lightcurve.sort_samples();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HesmaError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn step(time: f64, flux: f64) -> Table {
        Table::new()
            .with_floats("time", vec![time, time])
            .unwrap()
            .with_floats("wavelength", vec![1.0, 2.0])
            .unwrap()
            .with_floats("flux", vec![flux, flux])
            .unwrap()
    }

    #[test]
    fn partitions_in_input_order() {
        let groups = partition_by_model(vec![1, 2, 3, 4, 5, 6], 3).unwrap();
        assert_eq!(groups, vec![vec![1, 2], vec![3, 4], vec![5, 6]]);
        assert_eq!(
            partition_by_model(vec![1, 2, 3, 4], 3),
            Err(ShapeError::ShapeAmbiguity {
                items: 4,
                num_models: 3
            })
        );
        assert!(partition_by_model(Vec::<u8>::new(), 0).is_err());
    }

    #[test]
    fn spectra_sorted_by_time_within_model() {
        let tables = [step(2.0, 1.0), step(1.0, 2.0), step(5.0, 3.0), step(5.0, 4.0)];
        let merged = merge_spectra(&tables, 2).unwrap();
        assert_eq!(merged.len(), 2);
        let times: Vec<&Value> = merged[0].iter().map(|r| &r["time"]).collect();
        assert_eq!(times, [&json!(1.0), &json!(2.0)]);
        let fluxes: Vec<&Value> = merged[1].iter().map(|r| &r["flux"][0]).collect();
        assert_eq!(fluxes, [&json!(3.0), &json!(4.0)]);
    }

    #[test]
    fn non_constant_time_reports_global_index() {
        let mut bad = step(1.0, 1.0);
        bad.set_column("time", hm_core::ColumnData::Float(vec![1.0, 2.0]));
        let nested = vec![vec![step(0.0, 1.0)], vec![step(0.0, 1.0), bad]];
        assert!(matches!(
            merge_spectra_nested(&nested, 2),
            Err(HesmaError::Shape(ShapeError::TimeNotConstant { table_index: 2 }))
        ));
    }

    #[test]
    fn nested_count_must_match() {
        let nested = vec![vec![step(0.0, 1.0)], vec![step(0.0, 1.0)]];
        assert!(matches!(
            merge_spectra_nested(&nested, 3),
            Err(HesmaError::Shape(ShapeError::ShapeAmbiguity { items: 2, num_models: 3 }))
        ));
    }
}
