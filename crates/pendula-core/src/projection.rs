use crate::dynamics::Constants;
use crate::state::{Block, StateVector};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Planar joint positions of one pendulum, pivot at the origin, `y` down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CartesianFrame {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl CartesianFrame {
    pub fn upper(&self) -> Vector2<f64> {
        Vector2::new(self.x1, self.y1)
    }

    pub fn lower(&self) -> Vector2<f64> {
        Vector2::new(self.x2, self.y2)
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

/// Map every pendulum in `p` to its joint positions.
pub fn project(p: &StateVector, c: &Constants) -> Vec<CartesianFrame> {
    p.block(Block::Phi1)
        .iter()
        .zip(p.block(Block::Phi2))
        .map(|(phi1, phi2)| {
            let x1 = c.l1 * phi1.sin();
            let y1 = c.l1 * phi1.cos();
            CartesianFrame {
                x1,
                y1,
                x2: x1 + c.l2 * phi2.sin(),
                y2: y1 + c.l2 * phi2.cos(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_hanging_straight_down() {
        let c = Constants::default();
        let f = project(&StateVector::zeros(1), &c)[0];
        assert_eq!(f.to_array(), [0.0, c.l1, 0.0, c.l1 + c.l2]);
    }

    #[test]
    fn test_horizontal_rods() {
        let c = Constants::new(3.0, 1.0, 4.0, 1.0);
        let s = StateVector::from_blocks(&[FRAC_PI_2], &[0.0], &[FRAC_PI_2], &[0.0]).unwrap();
        let f = project(&s, &c)[0];
        assert_relative_eq!(f.x1, 3.0);
        assert_relative_eq!(f.x2, 7.0);
        assert_relative_eq!(f.y2, 0.0, epsilon = 1e-12);
        assert_relative_eq!((f.lower() - f.upper()).norm(), 4.0);
    }

    #[test]
    fn test_projection_is_pure() {
        let c = Constants::default();
        let s = StateVector::from_blocks(&[0.3, 2.0], &[1.0, 0.0], &[-1.0, 0.1], &[0.0, 4.0]).unwrap();
        let before = s.clone();
        let a = project(&s, &c);
        let b = project(&s, &c);
        assert_eq!(a, b);
        assert_eq!(s, before);
        assert_eq!(a.len(), 2);
    }
}
