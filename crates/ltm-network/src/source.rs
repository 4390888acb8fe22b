//! External heat injection.

use ltm_core::{BodyId, LtmResult, ensure_finite};

/// Fixed power (W) added to one body during every accumulation phase.
///
/// Unlike an exchange a source does not conserve energy inside the network.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatSource {
    label: String,
    body: BodyId,
    power: f64,
}

impl HeatSource {
    pub fn new(label: impl Into<String>, body: BodyId, power: f64) -> LtmResult<Self> {
        Ok(Self {
            label: label.into(),
            body,
            power: ensure_finite(power, "heat source power")?,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn body(&self) -> BodyId {
        self.body
    }

    pub fn power(&self) -> f64 {
        self.power
    }

    pub fn set_power(&mut self, power: f64) -> LtmResult<()> {
        self.power = ensure_finite(power, "heat source power")?;
        Ok(())
    }
}
