use crate::dynamics::{Constants, G};
use crate::state::StateVector;

/// Hamiltonian (kinetic + potential) of each pendulum in the batch.
///
/// Potential is measured from the pivot with `y` pointing down, matching the
/// projection, so a pendulum hanging at rest has the lowest energy.
pub fn pendulum_energies(p: &StateVector, c: &Constants) -> Vec<f64> {
    let Constants { l1, m1, l2, m2 } = *c;
    (0..p.pendulum_count())
        .map(|i| {
            let (phi1, p1, phi2, p2) = p.pendulum(i);
            let (sindif, cosdif) = (phi1 - phi2).sin_cos();
            let divisor = m1 + m2 * sindif * sindif;
            let kinetic = (m2 * l2 * l2 * p1 * p1 + (m1 + m2) * l1 * l1 * p2 * p2
                - 2.0 * m2 * l1 * l2 * p1 * p2 * cosdif)
                / (2.0 * m2 * l1 * l1 * l2 * l2 * divisor);
            let potential = -(m1 + m2) * G * l1 * phi1.cos() - m2 * G * l2 * phi2.cos();
            kinetic + potential
        })
        .collect()
}

/// Sum of [`pendulum_energies`].
pub fn total_energy(p: &StateVector, c: &Constants) -> f64 {
    pendulum_energies(p, c).iter().sum()
}
