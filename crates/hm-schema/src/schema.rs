//! Typed model entries, one per category.
//!
//! These types are only deserialized from documents that already passed
//! [`crate::validate_entry`], so serde errors here indicate a bug rather
//! than bad input.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::field::HydroField;

/// Physical quantity (or band) name to unit string.
pub type Units = BTreeMap<String, String>;

/// Bibliographic reference for a model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Source {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bibcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Source {
    pub fn is_empty(&self) -> bool {
        self.bibcode.is_none() && self.reference.is_none() && self.url.is_none()
    }
}

/// Fields shared by every model entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ModelHeader {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub units: Units,
}

impl ModelHeader {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// One radial zone of a 1D hydro profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct Hydro1DPoint(pub BTreeMap<HydroField, f64>);

impl Hydro1DPoint {
    pub fn get(&self, field: &HydroField) -> Option<f64> {
        self.0.get(field).copied()
    }

    pub fn insert(&mut self, field: HydroField, value: f64) {
        self.0.insert(field, value);
    }

    pub fn fields(&self) -> impl Iterator<Item = &HydroField> {
        self.0.keys()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hydro1DEntry {
    #[serde(flatten)]
    pub header: ModelHeader,
    pub data: Vec<Hydro1DPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LightcurveSample {
    pub time: f64,
    pub band: String,
    pub magnitude: f64,
    pub e_magnitude: f64,
    /// `-1` marks an angle-averaged sample.
    pub viewing_angle: f64,
}

/// Summary statistics for one band / viewing-angle sub-series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DerivedQuantities {
    pub band: String,
    pub viewing_angle: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_mag: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rise_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decline_rate_15: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decline_rate_40: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LightcurveEntry {
    #[serde(flatten)]
    pub header: ModelHeader,
    pub data: Vec<LightcurveSample>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub derived_data: Vec<DerivedQuantities>,
}

/// One timestep of a spectral time series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpectrumRecord {
    pub time: f64,
    pub wavelength: Vec<f64>,
    pub flux: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flux_err: Option<Vec<f64>>,
}

impl SpectrumRecord {
    pub fn len(&self) -> usize {
        self.wavelength.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelength.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpectrumEntry {
    #[serde(flatten)]
    pub header: ModelHeader,
    pub data: Vec<SpectrumRecord>,
}
