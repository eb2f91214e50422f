use crate::state::{concat, Block, StateVector};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------
pub const G: f64 = 9.81;

/// Physical parameters shared by every pendulum in a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Constants {
    pub l1: f64, // Upper rod length
    pub m1: f64, // Upper bob mass
    pub l2: f64, // Lower rod length
    pub m2: f64, // Lower bob mass
}

impl Default for Constants {
    fn default() -> Self {
        Self {
            l1: 8.0,
            m1: 5.0,
            l2: 6.0,
            m2: 5.0,
        }
    }
}

impl Constants {
    pub fn new(l1: f64, m1: f64, l2: f64, m2: f64) -> Self {
        Self { l1, m1, l2, m2 }
    }

    /// Strictly positive and finite lengths and masses keep the
    /// `m1 + m2 sin²Δ` divisor away from zero.
    pub fn is_admissible(&self) -> bool {
        [self.l1, self.m1, self.l2, self.m2]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }
}

// ---------------------------------------------------------------------------
// Equations of Motion
// ---------------------------------------------------------------------------

/// Hamilton's equations for N independent double pendulums.
///
/// The system is autonomous, so `_t` is only there to match the integrator's
/// `f(t, y)` shape. With `Δ = phi1 - phi2` and `D = m1 + m2 sin²Δ`:
///
/// ```text
/// dphi1 = (l2 p1 - l1 p2 cosΔ) / (l1² l2 D)
/// dphi2 = (l1 (m1+m2) p2 - l2 m2 p1 cosΔ) / (l1 l2² m2 D)
/// h1    = p1 p2 sinΔ / (l1 l2 D)
/// h2    = (m2 l2² p1² + (m1+m2) l1² p2² - 2 m2 l1 l2 p1 p2 cosΔ) / (2 l1² l2² D²)
/// dp1   = -(m1+m2) g l1 sin phi1 - h1 + 2 h2 sinΔ cosΔ
/// dp2   = -m2 g l2 sin phi2 + h1 - 2 h2 sinΔ cosΔ
/// ```
pub fn derivative(_t: f64, p: &StateVector, c: &Constants) -> StateVector {
    let Constants { l1, m1, l2, m2 } = *c;
    let n = p.pendulum_count();

    let phi1 = p.block(Block::Phi1);
    let p1 = p.block(Block::P1);
    let phi2 = p.block(Block::Phi2);
    let p2 = p.block(Block::P2);

    let mut dphi1 = Vec::with_capacity(n);
    let mut dp1 = Vec::with_capacity(n);
    let mut dphi2 = Vec::with_capacity(n);
    let mut dp2 = Vec::with_capacity(n);

    let m_sum = m1 + m2;
    for i in 0..n {
        let (sindif, cosdif) = (phi1[i] - phi2[i]).sin_cos();
        let divisor = m1 + m2 * sindif * sindif;

        let h1 = p1[i] * p2[i] * sindif / (l1 * l2 * divisor);
        let h2 = (m2 * l2 * l2 * p1[i] * p1[i] + m_sum * l1 * l1 * p2[i] * p2[i]
            - 2.0 * m2 * l1 * l2 * p1[i] * p2[i] * cosdif)
            / (2.0 * l1 * l1 * l2 * l2 * divisor * divisor);
        let coupling = 2.0 * h2 * sindif * cosdif;

        dphi1.push((l2 * p1[i] - l1 * p2[i] * cosdif) / (l1 * l1 * l2 * divisor));
        dphi2.push((l1 * m_sum * p2[i] - l2 * m2 * p1[i] * cosdif) / (l1 * l2 * l2 * m2 * divisor));
        dp1.push(-m_sum * G * l1 * phi1[i].sin() - h1 + coupling);
        dp2.push(-m2 * G * l2 * phi2[i].sin() + h1 - coupling);
    }

    let flat = concat([
        dphi1.as_slice(),
        dp1.as_slice(),
        dphi2.as_slice(),
        dp2.as_slice(),
    ]);
    StateVector::from_parts(flat, n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rest_at_bottom_is_equilibrium() {
        let d = derivative(0.0, &StateVector::zeros(3), &Constants::default());
        assert!(d.as_vector().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_released_from_rest_only_momenta_move() {
        let c = Constants::default();
        let s = StateVector::from_blocks(&[0.5], &[0.0], &[0.5], &[0.0]).unwrap();
        let d = derivative(0.0, &s, &c);
        assert_eq!(d.block(Block::Phi1)[0], 0.0);
        assert_eq!(d.block(Block::Phi2)[0], 0.0);
        // Momenta at rest reduce to the gravity torques.
        assert_relative_eq!(d.block(Block::P1)[0], -(c.m1 + c.m2) * G * c.l1 * 0.5f64.sin());
        assert_relative_eq!(d.block(Block::P2)[0], -c.m2 * G * c.l2 * 0.5f64.sin());
    }

    #[test]
    fn test_pendulums_are_independent() {
        let c = Constants::default();
        let both = StateVector::from_blocks(&[0.3, 1.2], &[2.0, -1.0], &[0.1, 2.5], &[0.5, 3.0]).unwrap();
        let first = StateVector::from_blocks(&[0.3], &[2.0], &[0.1], &[0.5]).unwrap();
        let d_both = derivative(0.0, &both, &c);
        let d_first = derivative(0.0, &first, &c);
        for block in Block::ALL {
            assert_relative_eq!(d_both.block(block)[0], d_first.block(block)[0]);
        }
    }

    #[test]
    fn test_angular_velocity_matches_hamiltonian_gradient() {
        // dphi/dt = dH/dp, checked by central differences on the energy.
        let c = Constants::new(4.0, 2.0, 7.0, 3.0);
        let (phi1, p1, phi2, p2) = (0.7, 1.3, -0.4, 0.8);
        let eps = 1e-5;
        let h = |p1: f64, p2: f64| {
            let s = StateVector::from_blocks(&[phi1], &[p1], &[phi2], &[p2]).unwrap();
            crate::energy::total_energy(&s, &c)
        };
        let s = StateVector::from_blocks(&[phi1], &[p1], &[phi2], &[p2]).unwrap();
        let d = derivative(0.0, &s, &c);
        let dh_dp1 = (h(p1 + eps, p2) - h(p1 - eps, p2)) / (2.0 * eps);
        let dh_dp2 = (h(p1, p2 + eps) - h(p1, p2 - eps)) / (2.0 * eps);
        assert_relative_eq!(d.block(Block::Phi1)[0], dh_dp1, epsilon = 1e-5);
        assert_relative_eq!(d.block(Block::Phi2)[0], dh_dp2, epsilon = 1e-5);
    }

    #[test]
    fn test_momentum_rate_matches_negative_hamiltonian_gradient() {
        let c = Constants::new(4.0, 2.0, 7.0, 3.0);
        let (phi1, p1, phi2, p2) = (0.7, 1.3, -0.4, 0.8);
        let eps = 1e-5;
        let h = |phi1: f64, phi2: f64| {
            let s = StateVector::from_blocks(&[phi1], &[p1], &[phi2], &[p2]).unwrap();
            crate::energy::total_energy(&s, &c)
        };
        let s = StateVector::from_blocks(&[phi1], &[p1], &[phi2], &[p2]).unwrap();
        let d = derivative(0.0, &s, &c);
        let dh_dphi1 = (h(phi1 + eps, phi2) - h(phi1 - eps, phi2)) / (2.0 * eps);
        let dh_dphi2 = (h(phi1, phi2 + eps) - h(phi1, phi2 - eps)) / (2.0 * eps);
        assert_relative_eq!(d.block(Block::P1)[0], -dh_dphi1, epsilon = 1e-5);
        assert_relative_eq!(d.block(Block::P2)[0], -dh_dphi2, epsilon = 1e-5);
    }

    #[test]
    fn test_admissible_constants() {
        assert!(Constants::default().is_admissible());
        assert!(!Constants::new(0.0, 1.0, 1.0, 1.0).is_admissible());
        assert!(!Constants::new(1.0, 1.0, f64::NAN, 1.0).is_admissible());
    }
}
