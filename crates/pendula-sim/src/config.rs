use crate::params::SLIDERS;
use pendula_core::{Constants, Result, SimError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Spread of the random nudge applied to both starting angles.
pub const DEFAULT_RANDOMNESS: f64 = 0.4;

/// Width of the square viewport the view scale maps onto.
const VIEWPORT: f64 = 100.0;
const VIEW_MARGIN: f64 = 1.05;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // Physical constants
    pub l1: f64,
    pub m1: f64,
    pub l2: f64,
    pub m2: f64,

    // Initial conditions
    pub phi1_init: f64,
    pub phi2_init: f64,
    pub pendulum_number: usize,
    pub deviation: f64,  // phi2 gap between neighbouring pendulums
    pub randomness: f64, // Width of the uniform nudge on both angles
    pub seed: Option<u64>,

    // Trails
    pub trails: bool,
    pub trail_length: usize,
    pub trail_update_interval: usize, // Frames between trail samples
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            l1: 8.0,
            m1: 5.0,
            l2: 6.0,
            m2: 5.0,
            phi1_init: 0.5,
            phi2_init: 0.5,
            pendulum_number: 1,
            deviation: 0.0,
            randomness: DEFAULT_RANDOMNESS,
            seed: None,
            trails: false,
            trail_length: 60,
            trail_update_interval: 3,
        }
    }
}

/// Which parts of a running simulation a new config invalidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigChange {
    /// `l1` or `l2` moved: view scale and run are stale.
    pub lengths: bool,
    /// `m1` or `m2` moved: run is stale.
    pub masses: bool,
    /// Batch size changed: state vector must be rebuilt.
    pub pendulum_number: bool,
    /// Anything that only matters at the next restart.
    pub deferred: bool,
}

impl ConfigChange {
    pub fn needs_restart(&self) -> bool {
        self.lengths || self.masses
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl SimulationConfig {
    pub fn constants(&self) -> Constants {
        Constants::new(self.l1, self.m1, self.l2, self.m2)
    }

    /// Scale from simulation lengths to a 100-unit viewport that fits both
    /// rods fully extended with a small margin.
    pub fn view_scale(&self) -> f64 {
        VIEWPORT / (2.0 * VIEW_MARGIN * (self.l1 + self.l2))
    }

    /// Trails are drawn only when enabled and given a non-zero length.
    pub fn trails_active(&self) -> bool {
        self.trails && self.trail_length > 0
    }

    pub fn validate(&self) -> Result<()> {
        if !self.constants().is_admissible() {
            return Err(SimError::InvalidConfig(format!(
                "rod lengths and masses must be positive and finite (l1={}, m1={}, l2={}, m2={})",
                self.l1, self.m1, self.l2, self.m2
            )));
        }
        for spec in &SLIDERS {
            let Some(value) = self.slider_value(spec.key) else {
                continue;
            };
            if !spec.contains(value) {
                return Err(SimError::InvalidConfig(format!(
                    "{} = {value} is outside {}..={}",
                    spec.key, spec.min, spec.max
                )));
            }
        }
        if self.trail_update_interval == 0 {
            return Err(SimError::InvalidConfig(
                "trail_update_interval must be at least 1".to_string(),
            ));
        }
        if !self.deviation.is_finite() {
            return Err(SimError::InvalidConfig("deviation must be finite".to_string()));
        }
        if !self.randomness.is_finite() || self.randomness < 0.0 {
            return Err(SimError::InvalidConfig(
                "randomness must be finite and non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Current value of the field a slider controls, by slider key.
    pub fn slider_value(&self, key: &str) -> Option<f64> {
        let value = match key {
            "l1" => self.l1,
            "m1" => self.m1,
            "l2" => self.l2,
            "m2" => self.m2,
            "phi1_init" => self.phi1_init,
            "phi2_init" => self.phi2_init,
            "pendulum_number" => self.pendulum_number as f64,
            "trail_length" => self.trail_length as f64,
            _ => return None,
        };
        Some(value)
    }

    /// Compare against the config currently in force.
    pub fn diff(&self, current: &SimulationConfig) -> ConfigChange {
        ConfigChange {
            lengths: self.l1 != current.l1 || self.l2 != current.l2,
            masses: self.m1 != current.m1 || self.m2 != current.m2,
            pendulum_number: self.pendulum_number != current.pendulum_number,
            deferred: self.phi1_init != current.phi1_init
                || self.phi2_init != current.phi2_init
                || self.deviation != current.deviation
                || self.randomness != current.randomness
                || self.seed != current.seed
                || self.trails != current.trails
                || self.trail_length != current.trail_length
                || self.trail_update_interval != current.trail_update_interval,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
