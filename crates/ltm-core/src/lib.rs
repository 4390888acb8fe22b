//! ltm-core: stable foundation for the lumped thermal model.
//!
//! Contains:
//! - ids (dense registration-order IDs for bodies, exchanges, sources)
//! - numeric (Real + tolerances + parameter checks)
//! - constants (physical constants used by exchange laws)
//! - error (shared error taxonomy)

pub mod constants;
pub mod error;
pub mod ids;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{LtmError, LtmResult};
pub use ids::*;
pub use numeric::*;
