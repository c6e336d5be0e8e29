//! One-dimensional hydrodynamic profiles.

use std::collections::BTreeSet;

use hm_core::{ColumnData, Real, Table, Tolerances, nearly_equal};
use hm_schema::{
    Category, HydroField, Hydro1DEntry, Hydro1DPoint, ModelHeader, Species, Units, complete_units,
};

/// A validated Hydro1D model: radial zones, each a sparse set of fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Hydro1D {
    entry: Hydro1DEntry,
}

impl Hydro1D {
    pub(crate) fn from_entry(entry: Hydro1DEntry) -> Self {
        Self { entry }
    }

    pub fn entry(&self) -> &Hydro1DEntry {
        &self.entry
    }

    pub fn into_entry(self) -> Hydro1DEntry {
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

    pub fn points(&self) -> &[Hydro1DPoint] {
        &self.entry.data
    }

    pub fn len(&self) -> usize {
        self.entry.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entry.data.is_empty()
    }

    /// Union of the fields carried by any point, physical fields first.
    pub fn fields(&self) -> BTreeSet<HydroField> {
        self.entry
            .data
            .iter()
            .flat_map(|p| p.fields().cloned())
            .collect()
    }

    pub fn abundance_species(&self) -> Vec<Species> {
        self.fields()
            .into_iter()
            .filter_map(|f| match f {
                HydroField::Abundance(species) => Some(species),
                _ => None,
            })
            .collect()
    }

    /// One row per point, one float column per observed field. Fields a
    /// point does not carry are `NaN`.
    pub fn to_table(&self) -> Table {
        table_of(self.name(), self.fields(), self.entry.data.iter())
    }

    /// Snapshot times in ascending order, without duplicates.
    pub fn unique_times(&self) -> Vec<Real> {
        let mut times: Vec<Real> = self
            .entry
            .data
            .iter()
            .filter_map(|p| p.get(&HydroField::Time))
            .collect();
        times.sort_by(|a, b| a.total_cmp(b));
        times.dedup();
        times
    }

    /// Rows of the snapshot at `time`.
    pub fn table_at_time(&self, time: Real) -> Table {
        let tol = Tolerances::default();
        let points = self.entry.data.iter().filter(|p| {
            p.get(&HydroField::Time)
                .is_some_and(|t| nearly_equal(t, time, tol))
        });
        table_of(self.name(), self.fields(), points)
    }

    /// Units with every recognized field filled in.
    pub fn units(&self) -> Units {
        complete_units::<&str>(Category::Hydro1D, &self.entry.header.units, &[])
    }
}

fn table_of<'a>(
    name: &str,
    fields: BTreeSet<HydroField>,
    points: impl Iterator<Item = &'a Hydro1DPoint> + Clone,
) -> Table {
    let mut table = Table::named(name);
    for field in fields {
        let values = points
            .clone()
            .map(|p| p.get(&field).unwrap_or(Real::NAN))
            .collect();
        table.set_column(field.as_str(), ColumnData::Float(values));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use hm_schema::ARB_UNIT_STRING;
    use pretty_assertions::assert_eq;

    fn point(pairs: &[(&str, f64)]) -> Hydro1DPoint {
        let mut p = Hydro1DPoint::default();
        for (name, value) in pairs {
            p.insert(name.parse().unwrap(), *value);
        }
        p
    }

    fn model() -> Hydro1D {
        let mut header = ModelHeader::new("h");
        header.units.insert("radius".to_string(), "cm".to_string());
        Hydro1D::from_entry(Hydro1DEntry {
            header,
            data: vec![
                point(&[("radius", 1.0), ("density", 3.0), ("time", 0.0), ("xNi56", 0.4)]),
                point(&[("radius", 2.0), ("density", 2.0), ("time", 0.0)]),
                point(&[("radius", 1.5), ("density", 1.0), ("time", 10.0), ("xHe", 0.2)]),
            ],
        })
    }

    #[test]
    fn table_columns_are_the_union_of_fields() {
        let table = model().to_table();
        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(names, ["radius", "density", "time", "xHe", "xNi56"]);
        assert_eq!(table.name(), Some("h"));
        let ni = table.floats("xNi56").unwrap();
        assert_eq!(ni[0], 0.4);
        assert!(ni[1].is_nan() && ni[2].is_nan());
        assert!(table.floats("pressure").is_none());
    }

    #[test]
    fn snapshots() {
        let h = model();
        assert_eq!(h.unique_times(), [0.0, 10.0]);
        let snap = h.table_at_time(0.0);
        assert_eq!(snap.num_rows(), 2);
        assert_eq!(snap.floats("radius").unwrap(), &[1.0, 2.0]);
        assert_eq!(h.table_at_time(5.0).num_rows(), 0);
    }

    #[test]
    fn species_and_units() {
        let h = model();
        let species_list = h.abundance_species();
        let species: Vec<&str> = species_list.iter().map(|s| s.as_str()).collect();
        assert_eq!(species, ["xHe", "xNi56"]);
        let units = h.units();
        assert_eq!(units["radius"], "cm");
        assert_eq!(units["velocity"], ARB_UNIT_STRING);
    }
}
