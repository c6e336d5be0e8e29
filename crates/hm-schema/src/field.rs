//! Hydro1D field names: fixed physical quantities plus open-ended species.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static ABUNDANCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^x[A-Za-z]{1,2}[0-9]{0,3}$").expect("abundance pattern is a valid regex")
});

/// `x` + 1-2 letters + 0-3 digits, e.g. `xNi56`, `xHe`.
pub fn is_abundance_name(name: &str) -> bool {
    ABUNDANCE_RE.is_match(name)
}

/// Chemical species carried as a mass-fraction field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Species(String);

impl Species {
    /// Accepts the full field name (`xNi56`).
    pub fn new(field_name: &str) -> Option<Self> {
        is_abundance_name(field_name).then(|| Self(field_name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField(pub String);

impl fmt::Display for UnknownField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown hydro field '{}'", self.0)
    }
}

impl std::error::Error for UnknownField {}

/// Key of a Hydro1D point. Ordering puts the physical fields first, in
/// their canonical order, followed by species sorted by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HydroField {
    Radius,
    Density,
    Pressure,
    Temperature,
    Mass,
    Velocity,
    Time,
    Abundance(Species),
}

impl HydroField {
    pub const PHYSICAL: [HydroField; 7] = [
        HydroField::Radius,
        HydroField::Density,
        HydroField::Pressure,
        HydroField::Temperature,
        HydroField::Mass,
        HydroField::Velocity,
        HydroField::Time,
    ];

    pub const REQUIRED: [HydroField; 3] =
        [HydroField::Radius, HydroField::Density, HydroField::Time];

    pub fn as_str(&self) -> &str {
        match self {
            HydroField::Radius => "radius",
            HydroField::Density => "density",
            HydroField::Pressure => "pressure",
            HydroField::Temperature => "temperature",
            HydroField::Mass => "mass",
            HydroField::Velocity => "velocity",
            HydroField::Time => "time",
            HydroField::Abundance(species) => species.as_str(),
        }
    }

    pub fn is_abundance(&self) -> bool {
        matches!(self, HydroField::Abundance(_))
    }

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }
}

impl FromStr for HydroField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s {
            "radius" => HydroField::Radius,
            "density" => HydroField::Density,
            "pressure" => HydroField::Pressure,
            "temperature" => HydroField::Temperature,
            "mass" => HydroField::Mass,
            "velocity" => HydroField::Velocity,
            "time" => HydroField::Time,
            other => HydroField::Abundance(
                Species::new(other).ok_or_else(|| UnknownField(other.to_string()))?,
            ),
        };
        Ok(field)
    }
}

impl TryFrom<String> for HydroField {
    type Error = UnknownField;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<HydroField> for String {
    fn from(field: HydroField) -> Self {
        field.as_str().to_string()
    }
}

impl fmt::Display for HydroField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn generated_species_are_accepted(name in "x[A-Za-z]{1,2}[0-9]{0,3}") {
            prop_assert!(is_abundance_name(&name));
            prop_assert!(name.parse::<HydroField>().is_ok());
        }

        #[test]
        fn names_without_x_prefix_are_rejected(name in "[A-Za-wyz][A-Za-z]{0,2}[0-9]{0,3}") {
            prop_assert!(!is_abundance_name(&name));
        }
    }
}
