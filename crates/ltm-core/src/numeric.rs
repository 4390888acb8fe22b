use crate::LtmError;

/// Floating point type used throughout system
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

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, LtmError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(LtmError::param(what, v))
    }
}

/// Accept only finite, strictly positive values (masses, capacities, resistances).
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, LtmError> {
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(LtmError::param(what, v))
    }
}

/// Accept finite values >= 0.
pub fn ensure_non_negative(v: Real, what: &'static str) -> Result<Real, LtmError> {
    if v.is_finite() && v >= 0.0 {
        Ok(v)
    } else {
        Err(LtmError::param(what, v))
    }
}

/// Fourth power, as used by radiation laws.
#[inline]
pub fn pow4(t: Real) -> Real {
    let t2 = t * t;
    t2 * t2
}
