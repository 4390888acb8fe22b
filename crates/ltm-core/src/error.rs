use thiserror::Error;

use crate::ids::Id;

pub type LtmResult<T> = Result<T, LtmError>;

/// Setup-time failures of the thermal engine.
///
/// All of them surface synchronously at the call that caused them and are
/// never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LtmError {
    /// Non-physical constructor argument (non-positive mass, capacity, resistance...).
    #[error("Invalid parameter: {what} (value={value})")]
    InvalidParameter { what: &'static str, value: f64 },

    /// An exchange or source names a body that is not registered.
    #[error("Invalid reference: {what} (id={id}, registered={len})")]
    InvalidReference {
        what: &'static str,
        id: Id,
        len: usize,
    },

    /// Operation not allowed in the current network phase.
    #[error("Invalid state: {what}")]
    InvalidState { what: &'static str },
}

impl LtmError {
    pub fn param(what: &'static str, value: f64) -> Self {
        LtmError::InvalidParameter { what, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = LtmError::param("mass must be positive", -1.0);
        assert_eq!(
            err.to_string(),
            "Invalid parameter: mass must be positive (value=-1)"
        );

        let err = LtmError::InvalidReference {
            what: "exchange second body",
            id: Id::from_index(7),
            len: 2,
        };
        assert!(err.to_string().contains("id=7"));
    }
}
