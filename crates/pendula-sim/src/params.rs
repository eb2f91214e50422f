//! Parameter definitions for the pendulum controls.

use serde::Serialize;
use std::f64::consts::TAU;

/// Parameter specification with bounds and step size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamSpec {
    /// Config field name.
    pub key: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
    /// Step size for sliders.
    pub step: f64,
    /// Whole numbers only.
    pub integer: bool,
}

impl ParamSpec {
    /// Create a new parameter specification.
    pub const fn new(
        key: &'static str,
        label: &'static str,
        min: f64,
        max: f64,
        step: f64,
        integer: bool,
    ) -> Self {
        Self {
            key,
            label,
            min,
            max,
            step,
            integer,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        let v = value.clamp(self.min, self.max);
        if self.integer {
            v.round()
        } else {
            v
        }
    }
}

/// Rod lengths and bob masses.
pub mod physical {
    use super::ParamSpec;

    pub const L1: ParamSpec = ParamSpec::new("l1", "Rod A Length", 3.0, 10.0, 0.1, false);
    pub const L2: ParamSpec = ParamSpec::new("l2", "Rod B Length", 3.0, 10.0, 0.1, false);
    pub const M1: ParamSpec = ParamSpec::new("m1", "Mass A", 1.0, 10.0, 0.1, false);
    pub const M2: ParamSpec = ParamSpec::new("m2", "Mass B", 1.0, 10.0, 0.1, false);
}

/// Starting angles.
pub mod initial {
    use super::{ParamSpec, TAU};

    pub const PHI1: ParamSpec = ParamSpec::new("phi1_init", "Angle A Initial", 0.0, TAU, 0.1, false);
    pub const PHI2: ParamSpec = ParamSpec::new("phi2_init", "Angle B Initial", 0.0, TAU, 0.1, false);
}

/// Batch size and trail display.
pub mod display {
    use super::ParamSpec;

    pub const PENDULUM_NUMBER: ParamSpec =
        ParamSpec::new("pendulum_number", "Pendulum Number", 1.0, 200.0, 1.0, true);
    pub const TRAIL_LENGTH: ParamSpec =
        ParamSpec::new("trail_length", "Trail Length", 0.0, 200.0, 1.0, true);
}

/// Every slider, in the order a control panel lists them.
pub static SLIDERS: [ParamSpec; 8] = [
    display::PENDULUM_NUMBER,
    display::TRAIL_LENGTH,
    physical::L1,
    physical::L2,
    physical::M1,
    physical::M2,
    initial::PHI1,
    initial::PHI2,
];

/// Look up a slider by its config key.
pub fn slider(key: &str) -> Option<&'static ParamSpec> {
    SLIDERS.iter().find(|spec| spec.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_spec() {
        let spec = ParamSpec::new("x", "Test", 0.0, 100.0, 1.0, false);
        assert_eq!(spec.label, "Test");
        assert_eq!(spec.min, 0.0);
        assert_eq!(spec.max, 100.0);
        assert_eq!(spec.step, 1.0);
    }

    #[test]
    fn test_clamp_rounds_integers() {
        assert_eq!(display::PENDULUM_NUMBER.clamp(0.0), 1.0);
        assert_eq!(display::PENDULUM_NUMBER.clamp(12.6), 13.0);
        assert_eq!(physical::L1.clamp(12.6), 10.0);
        assert!(initial::PHI2.contains(TAU));
        assert!(!physical::M1.contains(0.5));
    }

    #[test]
    fn test_slider_lookup() {
        assert_eq!(slider("m2"), Some(&physical::M2));
        assert!(slider("deviation").is_none());
    }
}
