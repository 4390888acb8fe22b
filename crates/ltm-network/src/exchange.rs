//! Pairwise heat exchange laws.
//!
//! Every exchange references two registered bodies, `first` and `second`.
//! A law returns the heat flow *into* `first`; the network adds it to
//! `first` and subtracts the very same value from `second`, so each exchange
//! sums to exactly zero over the network.

use std::fmt;

use ltm_core::constants::STEFAN_BOLTZMANN;
use ltm_core::{BodyId, LtmResult, ensure_non_negative, ensure_positive, pow4};
use nalgebra::DVector;

/// Temperatures and conductivities of an exchange's two bodies, sampled
/// before the current step's update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairState {
    pub t_first: f64,
    pub t_second: f64,
    pub k_first: f64,
    pub k_second: f64,
}

impl PairState {
    pub fn temperatures(t_first: f64, t_second: f64) -> Self {
        Self {
            t_first,
            t_second,
            k_first: 0.0,
            k_second: 0.0,
        }
    }
}

/// A heat flow rule between two bodies.
///
/// Laws are deterministic functions of the pair state and their own
/// parameters. Positive flow heats `first` and cools `second`.
pub trait ExchangeLaw: Send + Sync + fmt::Debug {
    /// Law name for debugging and identification.
    fn name(&self) -> &'static str;

    /// Heat flow into the first body (W).
    fn flow(&self, pair: PairState) -> f64;

    /// Whether `flow` reads the bodies' conductivities.
    ///
    /// Registration rejects such exchanges when a body carries no conductivity.
    fn needs_conductivity(&self) -> bool {
        false
    }
}

/// Linear conduction through a fixed thermal resistance (K/W).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conduction {
    pub resistance: f64,
}

impl Conduction {
    pub fn new(resistance: f64) -> LtmResult<Self> {
        ensure_positive(resistance, "thermal resistance must be positive")?;
        Ok(Self { resistance })
    }
}

impl ExchangeLaw for Conduction {
    fn name(&self) -> &'static str {
        "conduction"
    }

    fn flow(&self, pair: PairState) -> f64 {
        (pair.t_second - pair.t_first) / self.resistance
    }
}

/// Grey-body radiation with a precomputed exchange factor.
///
/// The factor already contains the Stefan-Boltzmann constant, so
/// temperatures must be absolute (K).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Radiation {
    pub factor: f64,
}

impl Radiation {
    pub fn new(factor: f64) -> LtmResult<Self> {
        ensure_non_negative(factor, "radiation exchange factor must be non-negative")?;
        Ok(Self { factor })
    }

    /// `correction * view * sigma`
    pub fn from_view_factor(correction_factor: f64, view_factor: f64) -> LtmResult<Self> {
        ensure_non_negative(correction_factor, "radiation correction factor")?;
        ensure_non_negative(view_factor, "radiation view factor")?;
        Self::new(correction_factor * view_factor * STEFAN_BOLTZMANN)
    }
}

impl ExchangeLaw for Radiation {
    fn name(&self) -> &'static str {
        "radiation"
    }

    fn flow(&self, pair: PairState) -> f64 {
        self.factor * (pow4(pair.t_second) - pow4(pair.t_first))
    }
}

/// Conduction across two halves whose resistance follows the bodies'
/// current conductivities: `R = shape_first / k_first + shape_second / k_second`.
///
/// A shape factor is the length over area (1/m) of each half of the contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactConduction {
    pub shape_first: f64,
    pub shape_second: f64,
}

impl ContactConduction {
    pub fn new(shape_first: f64, shape_second: f64) -> LtmResult<Self> {
        ensure_positive(shape_first, "contact shape factor must be positive")?;
        ensure_positive(shape_second, "contact shape factor must be positive")?;
        Ok(Self {
            shape_first,
            shape_second,
        })
    }

    pub fn resistance(&self, k_first: f64, k_second: f64) -> f64 {
        self.shape_first / k_first + self.shape_second / k_second
    }
}

impl ExchangeLaw for ContactConduction {
    fn name(&self) -> &'static str {
        "contact_conduction"
    }

    fn flow(&self, pair: PairState) -> f64 {
        (pair.t_second - pair.t_first) / self.resistance(pair.k_first, pair.k_second)
    }

    fn needs_conductivity(&self) -> bool {
        true
    }
}

/// Two-surface grey-body radiation factor, including sigma.
///
/// `sigma / ((1 - e_a) / (e_a A_a) + 1 / A_a + (1 - e_b) / (e_b A_b))`
pub fn radiation_exchange_factor(
    emissivity_a: f64,
    area_a: f64,
    emissivity_b: f64,
    area_b: f64,
) -> LtmResult<f64> {
    ensure_positive(emissivity_a, "emissivity must be positive")?;
    ensure_positive(emissivity_b, "emissivity must be positive")?;
    ensure_positive(area_a, "radiating area must be positive")?;
    ensure_positive(area_b, "radiating area must be positive")?;
    let resistance = (1.0 - emissivity_a) / (emissivity_a * area_a)
        + 1.0 / area_a
        + (1.0 - emissivity_b) / (emissivity_b * area_b);
    Ok(STEFAN_BOLTZMANN / resistance)
}

/// A labelled exchange between two bodies.
#[derive(Debug)]
pub struct Exchange {
    label: String,
    first: BodyId,
    second: BodyId,
    law: Box<dyn ExchangeLaw>,
}

impl Exchange {
    pub fn new(
        label: impl Into<String>,
        first: BodyId,
        second: BodyId,
        law: impl ExchangeLaw + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            first,
            second,
            law: Box::new(law),
        }
    }

    pub fn conduction(
        label: impl Into<String>,
        first: BodyId,
        second: BodyId,
        resistance: f64,
    ) -> LtmResult<Self> {
        Ok(Self::new(label, first, second, Conduction::new(resistance)?))
    }

    pub fn radiation(
        label: impl Into<String>,
        first: BodyId,
        second: BodyId,
        exchange_factor: f64,
    ) -> LtmResult<Self> {
        Ok(Self::new(label, first, second, Radiation::new(exchange_factor)?))
    }

    pub fn contact_conduction(
        label: impl Into<String>,
        first: BodyId,
        second: BodyId,
        shape_first: f64,
        shape_second: f64,
    ) -> LtmResult<Self> {
        Ok(Self::new(
            label,
            first,
            second,
            ContactConduction::new(shape_first, shape_second)?,
        ))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn first(&self) -> BodyId {
        self.first
    }

    pub fn second(&self) -> BodyId {
        self.second
    }

    pub fn law(&self) -> &dyn ExchangeLaw {
        self.law.as_ref()
    }

    /// Heat flow into `first` for the given pair state.
    pub fn flow(&self, pair: PairState) -> f64 {
        self.law.flow(pair)
    }

    /// Sample the pair state from the network vectors.
    pub(crate) fn pair_state(
        &self,
        temperatures: &DVector<f64>,
        conductivities: &DVector<f64>,
    ) -> PairState {
        let (i, j) = (self.first.slot(), self.second.slot());
        PairState {
            t_first: temperatures[i],
            t_second: temperatures[j],
            k_first: conductivities[i],
            k_second: conductivities[j],
        }
    }

    /// Accumulate this exchange's flow: `first += flow`, `second -= flow`.
    pub(crate) fn apply(
        &self,
        temperatures: &DVector<f64>,
        conductivities: &DVector<f64>,
        heats: &mut DVector<f64>,
    ) {
        let flow = self.flow(self.pair_state(temperatures, conductivities));
        heats[self.first.slot()] += flow;
        heats[self.second.slot()] -= flow;
    }
}
