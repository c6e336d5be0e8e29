/// Floating point type used for every stored quantity
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

/// NaN marks a missing value in tabular form.
#[inline]
pub fn is_missing(v: Real) -> bool {
    v.is_nan()
}

/// Equality where two missing values compare equal.
pub fn same_value(a: Real, b: Real, tol: Tolerances) -> bool {
    match (is_missing(a), is_missing(b)) {
        (true, true) => true,
        (false, false) => a == b || nearly_equal(a, b, tol),
        _ => false,
    }
}
