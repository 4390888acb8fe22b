//! Time integration for thermal networks.
//!
//! Provides:
//! - Fixed-step explicit Euler
//! - Adaptive-step Euler bounded by a desired per-step temperature change
//! - A simulation runner with decimated recording and a step observer

pub mod error;
pub mod integrator;
pub mod sim;

// Re-exports for public API
pub use error::{SimError, SimResult};
pub use integrator::{AdaptiveEuler, ForwardEuler, Integrator, evaluate, evaluate_adaptive};
pub use sim::{
    SimOptions, SimProgress, SimRecord, StepControl, Stepping, run_sim, run_sim_with_observer,
};
