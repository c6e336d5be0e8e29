//! Unit completion: every recognized field gets a unit string.

use crate::category::Category;
use crate::schema::Units;

/// Placeholder unit for quantities the producer did not annotate.
pub const ARB_UNIT_STRING: &str = "(arb. units)";

/// Copy of `units` with every recognized field of `category` filled in.
///
/// Lightcurve magnitudes are annotated per band, so `bands` adds one entry
/// per photometric band. Caller-supplied entries are never replaced.
pub fn complete_units<S: AsRef<str>>(category: Category, units: &Units, bands: &[S]) -> Units {
    let mut out = units.clone();
    for field in category.rules().unit_fields {
        fill(&mut out, field);
    }
    for band in bands {
        fill(&mut out, band.as_ref());
    }
    out
}

fn fill(units: &mut Units, field: &str) {
    if !units.contains_key(field) {
        units.insert(field.to_string(), ARB_UNIT_STRING.to_string());
    }
}
