//! Temperature-dependent material properties.

use std::fmt;
use std::sync::Arc;

use ltm_core::{LtmError, LtmResult, ensure_finite};

/// A scalar material property evaluated at a body temperature.
///
/// Used for specific heat (J / (kg K)) and thermal conductivity (W / (m K)).
#[derive(Clone)]
pub enum PropertyFn {
    /// Temperature independent value.
    Constant(f64),
    /// `c[0] + c[1] T + c[2] T^2 + ...`
    Polynomial(Vec<f64>),
    /// Piecewise-linear interpolation over `(T, value)` points sorted by T.
    /// Values outside the table are clamped to the end points.
    Table(Vec<(f64, f64)>),
    /// Arbitrary closure supplied by the application.
    Custom(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
}

impl PropertyFn {
    pub fn constant(value: f64) -> Self {
        PropertyFn::Constant(value)
    }

    pub fn polynomial(coeffs: Vec<f64>) -> LtmResult<Self> {
        if coeffs.is_empty() {
            return Err(LtmError::param("polynomial needs at least one coefficient", 0.0));
        }
        for &c in &coeffs {
            ensure_finite(c, "polynomial coefficient")?;
        }
        Ok(PropertyFn::Polynomial(coeffs))
    }

    /// Build an interpolation table. Points must be finite and strictly
    /// increasing in temperature.
    pub fn table(points: Vec<(f64, f64)>) -> LtmResult<Self> {
        if points.is_empty() {
            return Err(LtmError::param("property table needs at least one point", 0.0));
        }
        for &(t, v) in &points {
            ensure_finite(t, "property table temperature")?;
            ensure_finite(v, "property table value")?;
        }
        for pair in points.windows(2) {
            if pair[1].0 <= pair[0].0 {
                return Err(LtmError::param(
                    "property table temperatures must be strictly increasing",
                    pair[1].0,
                ));
            }
        }
        Ok(PropertyFn::Table(points))
    }

    pub fn custom(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        PropertyFn::Custom(Arc::new(f))
    }

    /// Evaluate the property at temperature `t`.
    pub fn eval(&self, t: f64) -> f64 {
        match self {
            PropertyFn::Constant(v) => *v,
            // Horner
            PropertyFn::Polynomial(coeffs) => coeffs.iter().rev().fold(0.0, |acc, c| acc * t + c),
            PropertyFn::Table(points) => interpolate(points, t),
            PropertyFn::Custom(f) => f(t),
        }
    }
}

fn interpolate(points: &[(f64, f64)], t: f64) -> f64 {
    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return f64::NAN,
    };
    if t <= first.0 {
        return first.1;
    }
    if t >= last.0 {
        return last.1;
    }
    // First point with temperature above t; exists because t < last.0.
    let hi = points.partition_point(|&(pt, _)| pt <= t);
    let (t0, v0) = points[hi - 1];
    let (t1, v1) = points[hi];
    v0 + (v1 - v0) * (t - t0) / (t1 - t0)
}

impl fmt::Debug for PropertyFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyFn::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            PropertyFn::Polynomial(c) => f.debug_tuple("Polynomial").field(c).finish(),
            PropertyFn::Table(p) => f.debug_tuple("Table").field(&p.len()).finish(),
            PropertyFn::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<f64> for PropertyFn {
    fn from(value: f64) -> Self {
        PropertyFn::Constant(value)
    }
}
