//! ltm-network: thermal bodies, exchange laws and the network that owns them.
//!
//! Provides:
//! - Body variants (dynamic, fixed capacity, constant temperature)
//! - Temperature-dependent material properties
//! - Pairwise exchange laws (conduction, radiation, contact conduction)
//! - External heat sources
//! - `ThermalNetwork`, the dense state container with two-phase steps
//!
//! # Example
//!
//! ```
//! use ltm_network::{Body, Exchange, ThermalNetwork};
//!
//! let mut net = ThermalNetwork::new("demo");
//! let a = net.register_body(Body::fixed_capacity("A", 1.0, 100.0).unwrap()).unwrap();
//! let b = net.register_body(Body::fixed_capacity("B", 1.0, 0.0).unwrap()).unwrap();
//! net.register_exchange(Exchange::conduction("a-b", a, b, 2.0).unwrap()).unwrap();
//!
//! net.accumulate_heat().unwrap();
//! assert_eq!(net.heat(a), Some(-50.0));
//! assert_eq!(net.heat(b), Some(50.0));
//! ```

pub mod body;
pub mod exchange;
pub mod network;
pub mod property;
pub mod source;

// Re-exports for ergonomics
pub use body::{Body, BodyKind};
pub use exchange::{
    Conduction, ContactConduction, Exchange, ExchangeLaw, PairState, Radiation,
    radiation_exchange_factor,
};
pub use network::{StepPhase, ThermalNetwork};
pub use property::PropertyFn;
pub use source::HeatSource;
