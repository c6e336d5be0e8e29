//! Photometric lightcurves, split into (band, viewing angle) sub-series.

use std::cmp::Ordering;

use hm_core::{ColumnData, Real, Table, Tolerances, nearly_equal};
use hm_schema::{
    Category, DerivedQuantities, LightcurveEntry, LightcurveSample, ModelHeader, Units,
    complete_units,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Lightcurve {
    entry: LightcurveEntry,
}

impl Lightcurve {
    pub(crate) fn from_entry(entry: LightcurveEntry) -> Self {
        Self { entry }
    }

    pub fn entry(&self) -> &LightcurveEntry {
        &self.entry
    }

    pub fn into_entry(self) -> LightcurveEntry {
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

    pub fn samples(&self) -> &[LightcurveSample] {
        &self.entry.data
    }

    pub fn len(&self) -> usize {
        self.entry.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entry.data.is_empty()
    }

    pub fn derived(&self) -> &[DerivedQuantities] {
        &self.entry.derived_data
    }

    /// Stable sort by band, then viewing angle, then time. Samples with
    /// equal keys keep their relative order.
    pub fn sort_samples(&mut self) {
        self.entry.data.sort_by(sample_order);
    }

    pub fn to_table(&self) -> Table {
        samples_table(self.name(), self.entry.data.iter())
    }

    /// Derived quantities, one row per (band, viewing angle). Absent
    /// quantities are `NaN`.
    pub fn derived_table(&self) -> Table {
        let rows = &self.entry.derived_data;
        let mut table = Table::named(self.name());
        table.set_column(
            "band",
            ColumnData::Text(rows.iter().map(|d| Some(d.band.clone())).collect()),
        );
        let float = |f: fn(&DerivedQuantities) -> Option<Real>| {
            ColumnData::Float(rows.iter().map(|d| f(d).unwrap_or(Real::NAN)).collect())
        };
        table.set_column("viewing_angle", float(|d| Some(d.viewing_angle)));
        table.set_column("peak_mag", float(|d| d.peak_mag));
        table.set_column("peak_time", float(|d| d.peak_time));
        table.set_column("rise_time", float(|d| d.rise_time));
        table.set_column("decline_rate_15", float(|d| d.decline_rate_15));
        table.set_column("decline_rate_40", float(|d| d.decline_rate_40));
        table
    }

    /// Bands in order of first appearance.
    pub fn bands(&self) -> Vec<&str> {
        let mut bands: Vec<&str> = Vec::new();
        for sample in &self.entry.data {
            if !bands.contains(&sample.band.as_str()) {
                bands.push(&sample.band);
            }
        }
        bands
    }

    /// Distinct viewing angles, ascending. `-1` (angle-averaged) sorts first.
    pub fn viewing_angles(&self) -> Vec<Real> {
        let mut angles: Vec<Real> = self.entry.data.iter().map(|s| s.viewing_angle).collect();
        angles.sort_by(|a, b| a.total_cmp(b));
        angles.dedup();
        angles
    }

    /// One sub-series, sorted by time.
    pub fn series(&self, band: &str, viewing_angle: Real) -> Table {
        let mut samples: Vec<&LightcurveSample> = self
            .entry
            .data
            .iter()
            .filter(|s| s.band == band && same_angle(s.viewing_angle, viewing_angle))
            .collect();
        samples.sort_by(|a, b| a.time.total_cmp(&b.time));
        samples_table(self.name(), samples.into_iter())
    }

    pub fn derived_for(&self, band: &str, viewing_angle: Real) -> Option<&DerivedQuantities> {
        self.entry
            .derived_data
            .iter()
            .find(|d| d.band == band && same_angle(d.viewing_angle, viewing_angle))
    }

    /// Units for time and every band in the data.
    pub fn units(&self) -> Units {
        complete_units(Category::Lightcurve, &self.entry.header.units, &self.bands())
    }
}

pub(crate) fn sample_order(a: &LightcurveSample, b: &LightcurveSample) -> Ordering {
    a.band
        .cmp(&b.band)
        .then(a.viewing_angle.total_cmp(&b.viewing_angle))
        .then(a.time.total_cmp(&b.time))
}

fn same_angle(a: Real, b: Real) -> bool {
    nearly_equal(a, b, Tolerances::default())
}

fn samples_table<'a>(
    name: &str,
    samples: impl Iterator<Item = &'a LightcurveSample> + Clone,
) -> Table {
    let floats = |f: fn(&LightcurveSample) -> Real| {
        ColumnData::Float(samples.clone().map(f).collect())
    };
    let mut table = Table::named(name);
    table.set_column("time", floats(|s| s.time));
    table.set_column(
        "band",
        ColumnData::Text(samples.clone().map(|s| Some(s.band.clone())).collect()),
    );
    table.set_column("magnitude", floats(|s| s.magnitude));
    table.set_column("e_magnitude", floats(|s| s.e_magnitude));
    table.set_column("viewing_angle", floats(|s| s.viewing_angle));
    table
}
