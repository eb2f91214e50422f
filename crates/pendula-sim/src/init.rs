use crate::config::SimulationConfig;
use pendula_core::{linspace, Block, StateVector};
use rand::Rng;
use rand_distr::{Distribution, Uniform};

/// Draw one nudge from `[-randomness/2, +randomness/2]`.
fn perturbation<R: Rng + ?Sized>(rng: &mut R, randomness: f64) -> f64 {
    if randomness <= 0.0 {
        return 0.0;
    }
    let half = randomness / 2.0;
    Uniform::new_inclusive(-half, half).sample(rng)
}

/// Lay out N pendulums at rest.
///
/// Every `phi1` is the same. `phi2` is spread linearly around its centre so
/// neighbours differ by exactly `deviation`. A single pendulum is a one-point
/// linspace at the centre, so `deviation` has no effect on it.
pub fn init_pendulums(phi1: f64, phi2: f64, deviation: f64, number: usize) -> StateVector {
    let phi1_block = linspace(phi1, phi1, number);
    let phi2_block = if number > 1 {
        let half_span = deviation / 2.0 * (number - 1) as f64;
        linspace(phi2 - half_span, phi2 + half_span, number)
    } else {
        linspace(phi2, phi2, number)
    };

    // Momenta stay zero: every pendulum starts at rest.
    let mut state = StateVector::zeros(number);
    state.block_mut(Block::Phi1).copy_from_slice(&phi1_block);
    state.block_mut(Block::Phi2).copy_from_slice(&phi2_block);
    state
}

/// Fresh state for `config`, with both base angles nudged by independent
/// draws from `rng`.
pub fn initial_state<R: Rng + ?Sized>(config: &SimulationConfig, rng: &mut R) -> StateVector {
    let phi1 = config.phi1_init + perturbation(rng, config.randomness);
    let phi2 = config.phi2_init + perturbation(rng, config.randomness);
    init_pendulums(phi1, phi2, config.deviation, config.pendulum_number)
}
