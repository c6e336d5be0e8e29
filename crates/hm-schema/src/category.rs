//! Per-category rule tables driving the validator.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Hydro1D,
    Lightcurve,
    Spectrum,
    /// Any radiative-transfer product: only the time-tagged point shape is checked.
    RtGeneric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Number,
    Text,
    NumberArray,
}

impl FieldKind {
    pub fn describe(self) -> &'static str {
        match self {
            FieldKind::Number => "a number",
            FieldKind::Text => "a string",
            FieldKind::NumberArray => "an array of numbers",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

const fn required(name: &'static str, kind: FieldKind) -> FieldRule {
    FieldRule {
        name,
        kind,
        required: true,
    }
}

const fn optional(name: &'static str, kind: FieldKind) -> FieldRule {
    FieldRule {
        name,
        kind,
        required: false,
    }
}

/// Treatment of point fields outside the fixed rule list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraFields {
    Reject,
    /// Accept names matching the abundance pattern as numbers, reject the rest.
    Abundances,
    Allow,
}

#[derive(Debug)]
pub struct CategoryRules {
    pub category: Category,
    pub point_fields: &'static [FieldRule],
    pub extra_fields: ExtraFields,
    pub min_points: usize,
    /// Rules for the sibling `derived_data` array; `None` leaves it unchecked.
    pub derived_fields: Option<&'static [FieldRule]>,
    /// Array fields inside one point must share a length.
    pub equal_length_arrays: bool,
    /// Fields that always receive a unit when units are completed.
    pub unit_fields: &'static [&'static str],
}

impl CategoryRules {
    pub fn point_rule(&self, name: &str) -> Option<&FieldRule> {
        self.point_fields.iter().find(|r| r.name == name)
    }

    pub fn required_point_fields(&self) -> impl Iterator<Item = &'static str> {
        self.point_fields
            .iter()
            .filter(|r| r.required)
            .map(|r| r.name)
    }
}

const HYDRO1D_FIELDS: &[FieldRule] = &[
    required("radius", FieldKind::Number),
    required("density", FieldKind::Number),
    optional("pressure", FieldKind::Number),
    optional("temperature", FieldKind::Number),
    optional("mass", FieldKind::Number),
    optional("velocity", FieldKind::Number),
    required("time", FieldKind::Number),
];

const LIGHTCURVE_FIELDS: &[FieldRule] = &[
    required("time", FieldKind::Number),
    required("band", FieldKind::Text),
    required("magnitude", FieldKind::Number),
    required("e_magnitude", FieldKind::Number),
    required("viewing_angle", FieldKind::Number),
];

const LIGHTCURVE_DERIVED_FIELDS: &[FieldRule] = &[
    required("band", FieldKind::Text),
    required("viewing_angle", FieldKind::Number),
    optional("peak_mag", FieldKind::Number),
    optional("peak_time", FieldKind::Number),
    optional("rise_time", FieldKind::Number),
    optional("decline_rate_15", FieldKind::Number),
    optional("decline_rate_40", FieldKind::Number),
];

const SPECTRUM_FIELDS: &[FieldRule] = &[
    required("time", FieldKind::Number),
    required("wavelength", FieldKind::NumberArray),
    required("flux", FieldKind::NumberArray),
    optional("flux_err", FieldKind::NumberArray),
];

const RT_GENERIC_FIELDS: &[FieldRule] = &[required("time", FieldKind::Number)];

static HYDRO1D_RULES: CategoryRules = CategoryRules {
    category: Category::Hydro1D,
    point_fields: HYDRO1D_FIELDS,
    extra_fields: ExtraFields::Abundances,
    min_points: 2,
    derived_fields: None,
    equal_length_arrays: false,
    unit_fields: &[
        "radius",
        "density",
        "pressure",
        "temperature",
        "mass",
        "velocity",
        "time",
    ],
};

static LIGHTCURVE_RULES: CategoryRules = CategoryRules {
    category: Category::Lightcurve,
    point_fields: LIGHTCURVE_FIELDS,
    extra_fields: ExtraFields::Reject,
    min_points: 1,
    derived_fields: Some(LIGHTCURVE_DERIVED_FIELDS),
    equal_length_arrays: false,
    // Bands are added per document.
    unit_fields: &["time"],
};

static SPECTRUM_RULES: CategoryRules = CategoryRules {
    category: Category::Spectrum,
    point_fields: SPECTRUM_FIELDS,
    extra_fields: ExtraFields::Reject,
    min_points: 1,
    derived_fields: None,
    equal_length_arrays: true,
    unit_fields: &["time", "wavelength", "flux", "flux_err"],
};

static RT_GENERIC_RULES: CategoryRules = CategoryRules {
    category: Category::RtGeneric,
    point_fields: RT_GENERIC_FIELDS,
    extra_fields: ExtraFields::Allow,
    min_points: 1,
    derived_fields: None,
    equal_length_arrays: false,
    unit_fields: &["time"],
};

impl Category {
    pub fn rules(self) -> &'static CategoryRules {
        match self {
            Category::Hydro1D => &HYDRO1D_RULES,
            Category::Lightcurve => &LIGHTCURVE_RULES,
            Category::Spectrum => &SPECTRUM_RULES,
            Category::RtGeneric => &RT_GENERIC_RULES,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Hydro1D => "hydro1d",
            Category::Lightcurve => "lightcurve",
            Category::Spectrum => "spectrum",
            Category::RtGeneric => "rt",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
