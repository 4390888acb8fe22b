//! Explicit time integrators.

use ltm_core::{LtmError, ensure_positive};
use ltm_network::ThermalNetwork;
use tracing::trace;

use crate::error::SimResult;

/// Default lower bound for adaptive steps (s).
pub const DEFAULT_MIN_DT: f64 = 0.001;
/// Default upper bound for adaptive steps (s).
pub const DEFAULT_MAX_DT: f64 = 1.0;

/// Trait for time integrators.
pub trait Integrator {
    /// Advance the network by one step and return the step size used.
    fn step(&mut self, network: &mut ThermalNetwork) -> SimResult<f64>;
}

/// Advance the network by one explicit Euler step of size `dt`.
///
/// 1. zero every heat accumulator
/// 2. evaluate every exchange (then every source) in registration order
/// 3. `T += H * invC * dt` for every body in registration order
///
/// The result is bit-for-bit deterministic for a given registration order.
pub fn evaluate(network: &mut ThermalNetwork, dt: f64) -> SimResult<()> {
    ensure_positive(dt, "time step must be positive")?;
    network.accumulate_heat()?;
    network.integrate(dt)?;
    Ok(())
}

/// Advance the network by one step whose size bounds the largest per-body
/// temperature change to `max_delta_t`.
///
/// With `Q_i = H_i * invC_i`, the step is `clamp(max_delta_t / max|Q_i|,
/// min_dt, max_dt)`, or `max_dt` when nothing changes. The chosen step is
/// written back through `dt`.
pub fn evaluate_adaptive(
    network: &mut ThermalNetwork,
    max_delta_t: f64,
    dt: &mut f64,
    min_dt: f64,
    max_dt: f64,
) -> SimResult<()> {
    check_adaptive_bounds(max_delta_t, min_dt, max_dt)?;

    network.accumulate_heat()?;
    let max_rate = network.heat_rates().amax();
    let selected = if max_rate == 0.0 {
        max_dt
    } else {
        (max_delta_t / max_rate).clamp(min_dt, max_dt)
    };
    trace!(max_rate, dt = selected, "adaptive step");
    network.integrate(selected)?;
    *dt = selected;
    Ok(())
}

fn check_adaptive_bounds(max_delta_t: f64, min_dt: f64, max_dt: f64) -> Result<(), LtmError> {
    ensure_positive(max_delta_t, "desired max temperature change must be positive")?;
    ensure_positive(min_dt, "minimum time step must be positive")?;
    ensure_positive(max_dt, "maximum time step must be positive")?;
    if min_dt > max_dt {
        return Err(LtmError::param(
            "minimum time step exceeds maximum time step",
            min_dt,
        ));
    }
    Ok(())
}

/// Forward Euler with a fixed step.
#[derive(Clone, Debug)]
pub struct ForwardEuler {
    dt: f64,
}

impl ForwardEuler {
    pub fn new(dt: f64) -> SimResult<Self> {
        ensure_positive(dt, "time step must be positive")?;
        Ok(Self { dt })
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }
}

impl Integrator for ForwardEuler {
    fn step(&mut self, network: &mut ThermalNetwork) -> SimResult<f64> {
        evaluate(network, self.dt)?;
        Ok(self.dt)
    }
}

/// Forward Euler with a step chosen per iteration from the fastest body.
#[derive(Clone, Debug)]
pub struct AdaptiveEuler {
    max_delta_t: f64,
    dt: f64,
    min_dt: f64,
    max_dt: f64,
}

impl AdaptiveEuler {
    /// `initial_dt` is only reported until the first step is taken.
    pub fn new(max_delta_t: f64, initial_dt: f64, min_dt: f64, max_dt: f64) -> SimResult<Self> {
        check_adaptive_bounds(max_delta_t, min_dt, max_dt)?;
        ensure_positive(initial_dt, "initial time step must be positive")?;
        Ok(Self {
            max_delta_t,
            dt: initial_dt,
            min_dt,
            max_dt,
        })
    }

    /// Default step bounds (`min_dt = 0.001`, `max_dt = 1`).
    pub fn with_default_bounds(max_delta_t: f64) -> SimResult<Self> {
        Self::new(max_delta_t, DEFAULT_MIN_DT, DEFAULT_MIN_DT, DEFAULT_MAX_DT)
    }

    /// Last selected step.
    pub fn dt(&self) -> f64 {
        self.dt
    }
}

impl Integrator for AdaptiveEuler {
    fn step(&mut self, network: &mut ThermalNetwork) -> SimResult<f64> {
        evaluate_adaptive(
            network,
            self.max_delta_t,
            &mut self.dt,
            self.min_dt,
            self.max_dt,
        )?;
        Ok(self.dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use ltm_core::{BodyId, Tolerances, nearly_equal};
    use ltm_network::{Body, Exchange};

    fn pair(t1: f64, t2: f64, r: f64) -> (ThermalNetwork, BodyId, BodyId) {
        let mut net = ThermalNetwork::new("pair");
        let a = net
            .register_body(Body::fixed_capacity("a", 1.0, t1).unwrap())
            .unwrap();
        let b = net
            .register_body(Body::fixed_capacity("b", 1.0, t2).unwrap())
            .unwrap();
        net.register_exchange(Exchange::conduction("ab", a, b, r).unwrap())
            .unwrap();
        (net, a, b)
    }

    #[test]
    fn fixed_step_concrete_values() {
        let (mut net, a, b) = pair(100.0, 0.0, 2.0);
        evaluate(&mut net, 0.001).unwrap();
        let tol = Tolerances::default();
        assert!(nearly_equal(net.temperature(a).unwrap(), 99.95, tol));
        assert!(nearly_equal(net.temperature(b).unwrap(), 0.05, tol));
    }

    #[test]
    fn fixed_step_rejects_bad_dt() {
        let (mut net, _, _) = pair(1.0, 0.0, 1.0);
        assert!(matches!(
            evaluate(&mut net, 0.0),
            Err(SimError::Engine(LtmError::InvalidParameter { .. }))
        ));
        // the network is left untouched
        assert!(!net.is_in_step());
        assert!(ForwardEuler::new(-1.0).is_err());
    }

    #[test]
    fn adaptive_selects_bounded_step() {
        // Q = 50 K/s on both bodies; 0.1 K target -> dt = 0.002
        let (mut net, a, _) = pair(100.0, 0.0, 2.0);
        let mut dt = 0.5;
        evaluate_adaptive(&mut net, 0.1, &mut dt, 1e-6, 1.0).unwrap();
        let tol = Tolerances::default();
        assert!(nearly_equal(dt, 0.002, tol));
        assert!(nearly_equal(net.temperature(a).unwrap(), 99.9, tol));
    }

    #[test]
    fn adaptive_clamps_to_bounds() {
        let (mut net, _, _) = pair(100.0, 0.0, 2.0);
        let mut dt = 0.0;
        evaluate_adaptive(&mut net, 0.1, &mut dt, 0.01, 1.0).unwrap();
        assert_eq!(dt, 0.01);

        let (mut net, _, _) = pair(100.0, 0.0, 2.0);
        evaluate_adaptive(&mut net, 1000.0, &mut dt, 0.01, 1.0).unwrap();
        assert_eq!(dt, 1.0);
    }

    #[test]
    fn adaptive_uses_max_dt_at_equilibrium() {
        let (mut net, a, b) = pair(20.0, 20.0, 2.0);
        let mut dt = 0.001;
        evaluate_adaptive(&mut net, 0.1, &mut dt, 0.001, 0.75).unwrap();
        assert_eq!(dt, 0.75);
        assert_eq!(net.temperature(a), Some(20.0));
        assert_eq!(net.temperature(b), Some(20.0));
        assert!(!net.is_in_step());
    }

    #[test]
    fn adaptive_rejects_inverted_bounds() {
        let (mut net, _, _) = pair(1.0, 0.0, 1.0);
        let mut dt = 0.1;
        assert!(evaluate_adaptive(&mut net, 0.1, &mut dt, 1.0, 0.1).is_err());
        assert!(evaluate_adaptive(&mut net, 0.0, &mut dt, 0.1, 1.0).is_err());
        assert_eq!(dt, 0.1);
        assert!(AdaptiveEuler::with_default_bounds(0.1).is_ok());
    }

    #[test]
    fn integrators_report_step_size() {
        let (mut net, _, _) = pair(100.0, 0.0, 2.0);
        let mut fixed = ForwardEuler::new(0.01).unwrap();
        assert_eq!(fixed.step(&mut net).unwrap(), 0.01);

        let mut adaptive = AdaptiveEuler::new(0.1, 0.5, 1e-6, 1.0).unwrap();
        assert_eq!(adaptive.dt(), 0.5);
        let dt = adaptive.step(&mut net).unwrap();
        assert_eq!(dt, adaptive.dt());
        assert!(dt < 0.5);
    }
}
