//! Error types for simulation operations.

use ltm_core::LtmError;
use thiserror::Error;

/// Errors encountered while stepping a thermal network.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid option: {what}")]
    InvalidOption { what: &'static str },

    #[error(transparent)]
    Engine(#[from] LtmError),
}

pub type SimResult<T> = Result<T, SimError>;
