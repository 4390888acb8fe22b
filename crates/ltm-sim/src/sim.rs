//! Simulation runner and result recording.

use ltm_network::ThermalNetwork;
use nalgebra::DVector;
use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::integrator::{AdaptiveEuler, DEFAULT_MAX_DT, DEFAULT_MIN_DT, ForwardEuler, Integrator};

/// Step size policy for a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Stepping {
    /// Explicit Euler with a fixed step (seconds).
    Fixed { dt: f64 },
    /// Explicit Euler with the step bounded by the largest temperature change.
    Adaptive {
        max_delta_t: f64,
        initial_dt: f64,
        min_dt: f64,
        max_dt: f64,
    },
}

impl Default for Stepping {
    fn default() -> Self {
        Stepping::Fixed { dt: 1e-3 }
    }
}

impl Stepping {
    /// Adaptive stepping with the default step bounds.
    pub fn adaptive(max_delta_t: f64) -> Self {
        Stepping::Adaptive {
            max_delta_t,
            initial_dt: DEFAULT_MIN_DT,
            min_dt: DEFAULT_MIN_DT,
            max_dt: DEFAULT_MAX_DT,
        }
    }
}

/// Options for simulation runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Final simulation time (seconds)
    pub t_end: f64,
    /// Maximum number of steps (safety limit)
    pub max_steps: usize,
    /// Record every N-th step (decimation)
    pub record_every: usize,
    /// Refresh temperature-dependent parameters every N steps, before the
    /// step's accumulation (0 = never)
    pub refresh_every: usize,
    /// Step size policy (default: fixed 1 ms)
    pub stepping: Stepping,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            t_end: 1.0,
            max_steps: 100_000,
            record_every: 10,
            refresh_every: 0,
            stepping: Stepping::default(),
        }
    }
}

impl SimOptions {
    fn validate(&self) -> SimResult<()> {
        if !(self.t_end.is_finite() && self.t_end >= 0.0) {
            return Err(SimError::InvalidOption {
                what: "t_end must be finite and non-negative",
            });
        }
        if self.max_steps == 0 {
            return Err(SimError::InvalidOption {
                what: "max_steps must be positive",
            });
        }
        if self.record_every == 0 {
            return Err(SimError::InvalidOption {
                what: "record_every must be positive",
            });
        }
        Ok(())
    }
}

/// Progress reported to the observer after every step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimProgress {
    /// Steps taken so far
    pub step: usize,
    /// Simulation time after the step (seconds)
    pub t: f64,
    /// Size of the step just taken (seconds)
    pub dt: f64,
}

/// Observer verdict after a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepControl {
    Continue,
    Stop,
}

/// Record of simulation results.
#[derive(Clone, Debug)]
pub struct SimRecord {
    /// Time points (seconds)
    pub t: Vec<f64>,
    /// Temperature snapshots, in body registration order
    pub temperatures: Vec<DVector<f64>>,
    /// Steps taken
    pub steps: usize,
    /// True when the observer asked to stop before `t_end`
    pub stopped: bool,
}

impl SimRecord {
    /// Final recorded time and temperatures.
    pub fn last(&self) -> Option<(f64, &DVector<f64>)> {
        self.t.last().copied().zip(self.temperatures.last())
    }
}

/// Run a simulation to `t_end` without observing individual steps.
pub fn run_sim(network: &mut ThermalNetwork, opts: &SimOptions) -> SimResult<SimRecord> {
    run_sim_with_observer(network, opts, |_, _| StepControl::Continue)
}

/// Run a simulation, calling `observer` after every step.
///
/// The initial and final states are always recorded; intermediate states
/// every `record_every` steps.
pub fn run_sim_with_observer<F>(
    network: &mut ThermalNetwork,
    opts: &SimOptions,
    observer: F,
) -> SimResult<SimRecord>
where
    F: FnMut(&SimProgress, &ThermalNetwork) -> StepControl,
{
    opts.validate()?;
    match opts.stepping {
        Stepping::Fixed { dt } => run_loop(network, opts, ForwardEuler::new(dt)?, observer),
        Stepping::Adaptive {
            max_delta_t,
            initial_dt,
            min_dt,
            max_dt,
        } => run_loop(
            network,
            opts,
            AdaptiveEuler::new(max_delta_t, initial_dt, min_dt, max_dt)?,
            observer,
        ),
    }
}

fn run_loop<I, F>(
    network: &mut ThermalNetwork,
    opts: &SimOptions,
    mut integrator: I,
    mut observer: F,
) -> SimResult<SimRecord>
where
    I: Integrator,
    F: FnMut(&SimProgress, &ThermalNetwork) -> StepControl,
{
    let mut t = 0.0;
    let mut record = SimRecord {
        t: vec![t],
        temperatures: vec![network.temperatures().clone()],
        steps: 0,
        stopped: false,
    };

    let mut step = 0;
    let mut recorded_last = true;
    while t < opts.t_end && step < opts.max_steps {
        if opts.refresh_every > 0 && step % opts.refresh_every == 0 {
            network.refresh_parameters()?;
        }
        let dt = integrator.step(network)?;
        t += dt;
        step += 1;

        // Record if decimation matches
        recorded_last = step % opts.record_every == 0;
        if recorded_last {
            record.t.push(t);
            record.temperatures.push(network.temperatures().clone());
        }

        let progress = SimProgress { step, t, dt };
        if observer(&progress, network) == StepControl::Stop {
            record.stopped = true;
            break;
        }
    }

    // Always record final state
    if !recorded_last {
        record.t.push(t);
        record.temperatures.push(network.temperatures().clone());
    }
    record.steps = step;
    debug!(steps = step, t, stopped = record.stopped, "simulation finished");
    Ok(record)
}
