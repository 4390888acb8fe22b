//! Thermal bodies (lumped masses).
//!
//! A body only describes *how* heat turns into temperature change. Its live
//! temperature and heat accumulator are stored by the [`ThermalNetwork`]
//! state vectors once the body is registered.
//!
//! [`ThermalNetwork`]: crate::ThermalNetwork

use ltm_core::{LtmResult, ensure_finite, ensure_positive};

use crate::property::PropertyFn;

/// Rule converting accumulated heat into a temperature change.
#[derive(Debug, Clone)]
pub enum BodyKind {
    /// Mass times a (possibly temperature-dependent) specific heat.
    Dynamic { mass: f64, specific_heat: PropertyFn },
    /// Explicit equivalent thermal capacity (J/K).
    FixedCapacity { capacity: f64 },
    /// Infinite capacity: heat is accumulated but never changes the temperature.
    Constant,
}

/// A thermal node ready to be registered in a network.
#[derive(Debug, Clone)]
pub struct Body {
    label: String,
    kind: BodyKind,
    initial_temperature: f64,
    conductivity: Option<PropertyFn>,
}

impl Body {
    /// Body with `mass` (kg) and specific heat (J / (kg K)).
    pub fn dynamic(
        label: impl Into<String>,
        mass: f64,
        specific_heat: impl Into<PropertyFn>,
        t0: f64,
    ) -> LtmResult<Self> {
        ensure_positive(mass, "body mass must be positive")?;
        Ok(Self::with_kind(
            label,
            BodyKind::Dynamic {
                mass,
                specific_heat: specific_heat.into(),
            },
            ensure_finite(t0, "initial temperature")?,
        ))
    }

    /// Body with an explicit thermal capacity (J/K).
    pub fn fixed_capacity(label: impl Into<String>, capacity: f64, t0: f64) -> LtmResult<Self> {
        ensure_positive(capacity, "body capacity must be positive")?;
        Ok(Self::with_kind(
            label,
            BodyKind::FixedCapacity { capacity },
            ensure_finite(t0, "initial temperature")?,
        ))
    }

    /// Constant temperature body (heat bath).
    pub fn constant(label: impl Into<String>, t0: f64) -> LtmResult<Self> {
        Ok(Self::with_kind(
            label,
            BodyKind::Constant,
            ensure_finite(t0, "initial temperature")?,
        ))
    }

    fn with_kind(label: impl Into<String>, kind: BodyKind, t0: f64) -> Self {
        Self {
            label: label.into(),
            kind,
            initial_temperature: t0,
            conductivity: None,
        }
    }

    /// Attach a thermal conductivity, needed by contact conduction exchanges.
    pub fn with_conductivity(mut self, conductivity: impl Into<PropertyFn>) -> Self {
        self.conductivity = Some(conductivity.into());
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> &BodyKind {
        &self.kind
    }

    pub fn initial_temperature(&self) -> f64 {
        self.initial_temperature
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.kind, BodyKind::Constant)
    }

    pub fn has_conductivity(&self) -> bool {
        self.conductivity.is_some()
    }

    /// Inverse thermal capacity (K/J) at temperature `t`. Zero for constant bodies.
    pub fn inverse_capacity(&self, t: f64) -> f64 {
        match &self.kind {
            BodyKind::Dynamic {
                mass,
                specific_heat,
            } => 1.0 / (mass * specific_heat.eval(t)),
            BodyKind::FixedCapacity { capacity } => 1.0 / capacity,
            BodyKind::Constant => 0.0,
        }
    }

    /// Thermal conductivity at `t`, or 0 when the body carries none.
    pub fn conductivity(&self, t: f64) -> f64 {
        self.conductivity.as_ref().map_or(0.0, |k| k.eval(t))
    }
}
