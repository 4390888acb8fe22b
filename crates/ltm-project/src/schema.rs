//! Project schema definitions.
//!
//! ```yaml
//! version: 1
//! name: demo
//! bodies:
//!   - kind: dynamic
//!     label: Body A
//!     temperature: 270
//!     mass: 0.5
//!     specific_heat: 400
//!   - kind: constant
//!     label: Bath
//!     temperature: 20
//! exchanges:
//!   - kind: conduction
//!     label: a-bath
//!     first: Body A
//!     second: Bath
//!     resistance: 1.4
//! run:
//!   t_end: 10
//!   stepping:
//!     mode: adaptive
//!     max_delta_t: 0.1
//! ```

use serde::{Deserialize, Serialize};

pub const LATEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub bodies: Vec<BodyDef>,
    #[serde(default)]
    pub exchanges: Vec<ExchangeDef>,
    #[serde(default)]
    pub sources: Vec<SourceDef>,
    #[serde(default)]
    pub run: RunDef,
}

/// Material property: a number, `{ polynomial: [c0, c1, ...] }` or
/// `{ table: [[T, value], ...] }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PropertyDef {
    Constant(f64),
    Polynomial { polynomial: Vec<f64> },
    Table { table: Vec<[f64; 2]> },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BodyDef {
    Dynamic {
        label: String,
        temperature: f64,
        mass: f64,
        specific_heat: PropertyDef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        conductivity: Option<PropertyDef>,
    },
    FixedCapacity {
        label: String,
        temperature: f64,
        capacity: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        conductivity: Option<PropertyDef>,
    },
    Constant {
        label: String,
        temperature: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        conductivity: Option<PropertyDef>,
    },
}

impl BodyDef {
    pub fn label(&self) -> &str {
        match self {
            BodyDef::Dynamic { label, .. }
            | BodyDef::FixedCapacity { label, .. }
            | BodyDef::Constant { label, .. } => label,
        }
    }

    pub fn conductivity(&self) -> Option<&PropertyDef> {
        match self {
            BodyDef::Dynamic { conductivity, .. }
            | BodyDef::FixedCapacity { conductivity, .. }
            | BodyDef::Constant { conductivity, .. } => conductivity.as_ref(),
        }
    }
}

/// Exchanges reference bodies by label.
///
/// A radiation exchange takes exactly one coefficient form: `factor`
/// (sigma included), `view_factor` (with optional `correction_factor`,
/// default 1), or grey-body `emissivity` + `area` pairs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExchangeDef {
    Conduction {
        label: String,
        first: String,
        second: String,
        resistance: f64,
    },
    Radiation {
        label: String,
        first: String,
        second: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        factor: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        correction_factor: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        view_factor: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        emissivity: Option<[f64; 2]>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        area: Option<[f64; 2]>,
    },
    ContactConduction {
        label: String,
        first: String,
        second: String,
        shape_first: f64,
        shape_second: f64,
    },
}

impl ExchangeDef {
    pub fn label(&self) -> &str {
        match self {
            ExchangeDef::Conduction { label, .. }
            | ExchangeDef::Radiation { label, .. }
            | ExchangeDef::ContactConduction { label, .. } => label,
        }
    }

    /// Labels of the (first, second) bodies.
    pub fn bodies(&self) -> (&str, &str) {
        match self {
            ExchangeDef::Conduction { first, second, .. }
            | ExchangeDef::Radiation { first, second, .. }
            | ExchangeDef::ContactConduction { first, second, .. } => (first, second),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceDef {
    pub label: String,
    pub body: String,
    pub power: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunDef {
    #[serde(default = "default_t_end")]
    pub t_end: f64,
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    #[serde(default = "default_record_every")]
    pub record_every: usize,
    #[serde(default)]
    pub refresh_every: usize,
    #[serde(default)]
    pub stepping: SteppingDef,
}

impl Default for RunDef {
    fn default() -> Self {
        Self {
            t_end: default_t_end(),
            max_steps: default_max_steps(),
            record_every: default_record_every(),
            refresh_every: 0,
            stepping: SteppingDef::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SteppingDef {
    Fixed {
        dt: f64,
    },
    Adaptive {
        max_delta_t: f64,
        #[serde(default = "default_min_dt")]
        initial_dt: f64,
        #[serde(default = "default_min_dt")]
        min_dt: f64,
        #[serde(default = "default_max_dt")]
        max_dt: f64,
    },
}

impl Default for SteppingDef {
    fn default() -> Self {
        SteppingDef::Fixed { dt: 1e-3 }
    }
}

fn default_t_end() -> f64 {
    1.0
}

fn default_max_steps() -> usize {
    10_000_000
}

fn default_record_every() -> usize {
    1
}

fn default_min_dt() -> f64 {
    ltm_sim::integrator::DEFAULT_MIN_DT
}

fn default_max_dt() -> f64 {
    ltm_sim::integrator::DEFAULT_MAX_DT
}
