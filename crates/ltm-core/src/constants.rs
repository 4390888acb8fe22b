//! Physical constants.

/// Stefan-Boltzmann constant (W m^-2 K^-4).
pub const STEFAN_BOLTZMANN: f64 = 5.6704e-8;
