//! The thermal network: registry of bodies, exchanges and sources plus the
//! dense state vectors the integrators operate on.

use std::fmt;

use ltm_core::{
    BodyId, ExchangeId, Id, LtmError, LtmResult, SourceId, ensure_finite, ensure_non_negative,
    ensure_positive, pow4,
};
use nalgebra::DVector;
use tracing::debug;

use crate::body::Body;
use crate::exchange::Exchange;
use crate::source::HeatSource;

/// Where the network is inside a time step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepPhase {
    /// Between steps; topology and temperatures may be changed.
    #[default]
    Idle,
    /// Heats hold this step's accumulated flows; waiting for integration.
    Accumulated,
}

/// Owner of all bodies, exchanges and heat sources of a model.
///
/// State lives in parallel dense vectors indexed by [`BodyId::slot`]:
/// temperature, accumulated heat, inverse capacity and conductivity. Body
/// registration extends all of them in lockstep.
///
/// A step is split in two phases so that no body integrates a partial heat
/// value: [`accumulate_heat`](Self::accumulate_heat) zeroes the heats and
/// evaluates every exchange then every source in registration order;
/// [`integrate`](Self::integrate) applies `T += H * invC * dt` and clears the
/// heats. Topology changes are rejected between the two.
#[derive(Debug)]
pub struct ThermalNetwork {
    label: String,
    bodies: Vec<Body>,
    exchanges: Vec<Exchange>,
    sources: Vec<HeatSource>,
    temperatures: DVector<f64>,
    heats: DVector<f64>,
    inv_capacities: DVector<f64>,
    conductivities: DVector<f64>,
    phase: StepPhase,
}

fn next_id(len: usize, what: &'static str) -> LtmResult<Id> {
    u32::try_from(len)
        .ok()
        .filter(|&index| index < u32::MAX)
        .map(Id::from_index)
        .ok_or(LtmError::InvalidState { what })
}

fn push_slot(v: &mut DVector<f64>, value: f64) {
    v.extend(std::iter::once(value));
}

impl ThermalNetwork {
    /// Create an empty network.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            bodies: Vec::new(),
            exchanges: Vec::new(),
            sources: Vec::new(),
            temperatures: DVector::zeros(0),
            heats: DVector::zeros(0),
            inv_capacities: DVector::zeros(0),
            conductivities: DVector::zeros(0),
            phase: StepPhase::Idle,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    pub fn is_in_step(&self) -> bool {
        self.phase == StepPhase::Accumulated
    }

    fn ensure_idle(&self, what: &'static str) -> LtmResult<()> {
        match self.phase {
            StepPhase::Idle => Ok(()),
            StepPhase::Accumulated => Err(LtmError::InvalidState { what }),
        }
    }

    fn ensure_body(&self, id: BodyId, what: &'static str) -> LtmResult<()> {
        if id.slot() < self.bodies.len() {
            Ok(())
        } else {
            Err(LtmError::InvalidReference {
                what,
                id,
                len: self.bodies.len(),
            })
        }
    }

    // ---------------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------------

    /// Register a body and return its id (= number of bodies before the call).
    pub fn register_body(&mut self, body: Body) -> LtmResult<BodyId> {
        self.ensure_idle("cannot register a body while a step is in progress")?;
        let id = next_id(self.bodies.len(), "body registry is full")?;

        let t0 = body.initial_temperature();
        let inv_c = ensure_non_negative(
            body.inverse_capacity(t0),
            "inverse capacity at initial temperature",
        )?;
        let k = if body.has_conductivity() {
            ensure_positive(body.conductivity(t0), "conductivity at initial temperature")?
        } else {
            0.0
        };

        push_slot(&mut self.temperatures, t0);
        push_slot(&mut self.heats, 0.0);
        push_slot(&mut self.inv_capacities, inv_c);
        push_slot(&mut self.conductivities, k);
        debug!(id = %id, label = body.label(), t0, inv_c, "registered body");
        self.bodies.push(body);
        Ok(id)
    }

    /// Register an exchange between two already registered bodies.
    pub fn register_exchange(&mut self, exchange: Exchange) -> LtmResult<ExchangeId> {
        self.ensure_idle("cannot register an exchange while a step is in progress")?;
        self.ensure_body(exchange.first(), "exchange first body is not registered")?;
        self.ensure_body(exchange.second(), "exchange second body is not registered")?;
        if exchange.law().needs_conductivity() {
            for body in [exchange.first(), exchange.second()] {
                ensure_positive(
                    self.conductivities[body.slot()],
                    "exchange law needs a body conductivity",
                )?;
            }
        }
        let id = next_id(self.exchanges.len(), "exchange registry is full")?;
        debug!(
            id = %id,
            label = exchange.label(),
            law = exchange.law().name(),
            first = %exchange.first(),
            second = %exchange.second(),
            "registered exchange"
        );
        self.exchanges.push(exchange);
        Ok(id)
    }

    /// Register an external heat source on a registered body.
    pub fn register_source(&mut self, source: HeatSource) -> LtmResult<SourceId> {
        self.ensure_idle("cannot register a heat source while a step is in progress")?;
        self.ensure_body(source.body(), "heat source body is not registered")?;
        let id = next_id(self.sources.len(), "source registry is full")?;
        debug!(id = %id, label = source.label(), power = source.power(), "registered heat source");
        self.sources.push(source);
        Ok(id)
    }

    /// Release every body, exchange and source. Calling it twice is harmless.
    pub fn destroy(&mut self) {
        self.bodies.clear();
        self.exchanges.clear();
        self.sources.clear();
        self.temperatures = DVector::zeros(0);
        self.heats = DVector::zeros(0);
        self.inv_capacities = DVector::zeros(0);
        self.conductivities = DVector::zeros(0);
        self.phase = StepPhase::Idle;
    }

    // ---------------------------------------------------------------------
    // Lookup
    // ---------------------------------------------------------------------

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    pub fn sources(&self) -> &[HeatSource] {
        &self.sources
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.slot())
    }

    pub fn exchange(&self, id: ExchangeId) -> Option<&Exchange> {
        self.exchanges.get(id.slot())
    }

    pub fn source(&self, id: SourceId) -> Option<&HeatSource> {
        self.sources.get(id.slot())
    }

    /// First body with this label, in registration order.
    pub fn find_body_by_label(&self, label: &str) -> Option<BodyId> {
        self.bodies
            .iter()
            .position(|b| b.label() == label)
            .map(|i| Id::from_index(i as u32))
    }

    /// First exchange with this label, in registration order.
    pub fn find_exchange_by_label(&self, label: &str) -> Option<ExchangeId> {
        self.exchanges
            .iter()
            .position(|e| e.label() == label)
            .map(|i| Id::from_index(i as u32))
    }

    /// First heat source with this label, in registration order.
    pub fn find_source_by_label(&self, label: &str) -> Option<SourceId> {
        self.sources
            .iter()
            .position(|s| s.label() == label)
            .map(|i| Id::from_index(i as u32))
    }

    // ---------------------------------------------------------------------
    // State access
    // ---------------------------------------------------------------------

    pub fn temperatures(&self) -> &DVector<f64> {
        &self.temperatures
    }

    pub fn heats(&self) -> &DVector<f64> {
        &self.heats
    }

    pub fn inverse_capacities(&self) -> &DVector<f64> {
        &self.inv_capacities
    }

    pub fn conductivities(&self) -> &DVector<f64> {
        &self.conductivities
    }

    pub fn temperature(&self, id: BodyId) -> Option<f64> {
        self.temperatures.get(id.slot()).copied()
    }

    pub fn temperature4(&self, id: BodyId) -> Option<f64> {
        self.temperature(id).map(pow4)
    }

    pub fn heat(&self, id: BodyId) -> Option<f64> {
        self.heats.get(id.slot()).copied()
    }

    pub fn inverse_capacity(&self, id: BodyId) -> Option<f64> {
        self.inv_capacities.get(id.slot()).copied()
    }

    pub fn conductivity(&self, id: BodyId) -> Option<f64> {
        self.conductivities.get(id.slot()).copied()
    }

    /// Current flow into the exchange's first body, without side effects.
    pub fn exchange_flow(&self, id: ExchangeId) -> Option<f64> {
        let exchange = self.exchange(id)?;
        Some(exchange.flow(exchange.pair_state(&self.temperatures, &self.conductivities)))
    }

    /// Overwrite the temperature of a non-constant body between steps.
    pub fn set_temperature(&mut self, id: BodyId, t: f64) -> LtmResult<()> {
        self.ensure_idle("cannot set a temperature while a step is in progress")?;
        self.ensure_body(id, "body is not registered")?;
        let t = ensure_finite(t, "temperature")?;
        if self.bodies[id.slot()].is_constant() {
            return Err(LtmError::param("constant body temperature is immutable", t));
        }
        self.temperatures[id.slot()] = t;
        Ok(())
    }

    /// Change the power of a registered heat source between steps.
    pub fn set_source_power(&mut self, id: SourceId, power: f64) -> LtmResult<()> {
        self.ensure_idle("cannot change a heat source while a step is in progress")?;
        let len = self.sources.len();
        let source = self
            .sources
            .get_mut(id.slot())
            .ok_or(LtmError::InvalidReference {
                what: "heat source is not registered",
                id,
                len,
            })?;
        source.set_power(power)
    }

    /// Add heat to a body during the current step (after accumulation,
    /// before integration). May be called several times per step.
    pub fn add_heat(&mut self, id: BodyId, dh: f64) -> LtmResult<()> {
        if self.phase != StepPhase::Accumulated {
            return Err(LtmError::InvalidState {
                what: "heat can only be added after accumulation",
            });
        }
        self.ensure_body(id, "body is not registered")?;
        self.heats[id.slot()] += dh;
        Ok(())
    }

    /// Recompute inverse capacities and conductivities from the current
    /// temperatures. Never called implicitly: the caller decides where it
    /// sits relative to the steps.
    pub fn refresh_parameters(&mut self) -> LtmResult<()> {
        self.ensure_idle("cannot refresh parameters while a step is in progress")?;
        for (i, body) in self.bodies.iter().enumerate() {
            let t = self.temperatures[i];
            self.inv_capacities[i] = body.inverse_capacity(t);
            self.conductivities[i] = body.conductivity(t);
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Step phases
    // ---------------------------------------------------------------------

    /// First half of a step: zero every heat accumulator, then evaluate all
    /// exchanges and sources in registration order.
    pub fn accumulate_heat(&mut self) -> LtmResult<()> {
        self.ensure_idle("heat already accumulated for this step")?;
        self.heats.fill(0.0);
        for exchange in &self.exchanges {
            exchange.apply(&self.temperatures, &self.conductivities, &mut self.heats);
        }
        for source in &self.sources {
            self.heats[source.body().slot()] += source.power();
        }
        self.phase = StepPhase::Accumulated;
        Ok(())
    }

    /// Per-body temperature rates `Q_i = H_i * invC_i` (K/s).
    pub fn heat_rates(&self) -> DVector<f64> {
        self.heats.component_mul(&self.inv_capacities)
    }

    /// Second half of a step: `T += H * invC * dt` for every body, then
    /// clear the heats. Constant bodies have `invC = 0` and keep their
    /// temperature.
    ///
    /// A non-finite `dt` abandons the step: temperatures are untouched, the
    /// heats are cleared and the network is idle again.
    pub fn integrate(&mut self, dt: f64) -> LtmResult<()> {
        if self.phase != StepPhase::Accumulated {
            return Err(LtmError::InvalidState {
                what: "integrate called before accumulating heat",
            });
        }
        let dt = match ensure_finite(dt, "time step") {
            Ok(dt) => dt,
            Err(e) => {
                self.heats.fill(0.0);
                self.phase = StepPhase::Idle;
                return Err(e);
            }
        };
        let rates = self.heat_rates();
        self.temperatures.axpy(dt, &rates, 1.0);
        self.heats.fill(0.0);
        self.phase = StepPhase::Idle;
        Ok(())
    }
}

impl Default for ThermalNetwork {
    fn default() -> Self {
        Self::new("network")
    }
}

impl fmt::Display for ThermalNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (body, t) in self.bodies.iter().zip(self.temperatures.iter()) {
            writeln!(f, " - {}: {:.6}", body.label(), t)?;
        }
        Ok(())
    }
}
