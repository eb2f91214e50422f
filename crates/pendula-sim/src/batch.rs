use crate::config::SimulationConfig;
use crate::simulator::PendulumSimulator;
use pendula_core::{pendulum_energies, AnimationLock, Block, CartesianFrame, Result};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Batch Result
// ---------------------------------------------------------------------------

/// A headless run recorded frame by frame. Index 0 is the initial state.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub config: SimulationConfig,
    pub view_scale: f64,
    pub time: Vec<f64>,
    /// `frames[k][i]`: pendulum `i` at frame `k`.
    pub frames: Vec<Vec<CartesianFrame>>,
    pub phi1: Vec<Vec<f64>>,
    pub phi2: Vec<Vec<f64>>,
    /// `pendulum_energy[k][i]`: Hamiltonian of pendulum `i` at frame `k`.
    pub pendulum_energy: Vec<Vec<f64>>,
    /// Total energy of the batch at each frame.
    pub energy: Vec<f64>,
    /// Trails as they stand after the last frame.
    pub trails: Vec<Vec<[f64; 2]>>,
}

impl BatchResult {
    pub fn frame_count(&self) -> usize {
        self.time.len()
    }

    pub fn pendulum_count(&self) -> usize {
        self.config.pendulum_number
    }

    /// Largest `|E - E0| / |E0|` over the run.
    pub fn energy_drift(&self) -> f64 {
        let Some(&e0) = self.energy.first() else {
            return 0.0;
        };
        let scale = if e0.abs() > 1e-12 { e0.abs() } else { 1.0 };
        self.energy
            .iter()
            .map(|e| (e - e0).abs() / scale)
            .fold(0.0, f64::max)
    }

    /// Widest distance between any two lower bobs at frame `k`.
    pub fn lower_spread(&self, k: usize) -> f64 {
        let Some(frame) = self.frames.get(k) else {
            return 0.0;
        };
        let mut widest: f64 = 0.0;
        for (i, a) in frame.iter().enumerate() {
            for b in &frame[i + 1..] {
                widest = widest.max((a.lower() - b.lower()).norm());
            }
        }
        widest
    }

    pub fn final_spread(&self) -> f64 {
        self.lower_spread(self.frames.len().saturating_sub(1))
    }

    /// First frame at which the lower bobs are more than `threshold` apart.
    pub fn divergence_frame(&self, threshold: f64) -> Option<usize> {
        (0..self.frames.len()).find(|&k| self.lower_spread(k) > threshold)
    }
}

// ---------------------------------------------------------------------------
// Main Loop
// ---------------------------------------------------------------------------

/// Run `frames` displayed frames without a host, recording every one.
///
/// Uses a private lock, so batch runs never contend with live animations.
pub fn run_batch(config: &SimulationConfig, frames: usize) -> Result<BatchResult> {
    let mut sim = PendulumSimulator::new(config.clone(), AnimationLock::new())?;

    let mut res = BatchResult {
        config: config.clone(),
        view_scale: sim.view_scale(),
        time: Vec::with_capacity(frames + 1),
        frames: Vec::with_capacity(frames + 1),
        phi1: Vec::with_capacity(frames + 1),
        phi2: Vec::with_capacity(frames + 1),
        pendulum_energy: Vec::with_capacity(frames + 1),
        energy: Vec::with_capacity(frames + 1),
        trails: Vec::new(),
    };

    record(&mut res, &sim);
    sim.start();
    for _ in 0..frames {
        if sim.frame()?.is_none() {
            break;
        }
        record(&mut res, &sim);
    }
    sim.stop();
    res.trails = sim.trails().snapshot();

    Ok(res)
}

fn record(res: &mut BatchResult, sim: &PendulumSimulator) {
    let state = sim.state();
    res.time.push(sim.time());
    res.frames.push(sim.frames().to_vec());
    res.phi1.push(state.block(Block::Phi1).to_vec());
    res.phi2.push(state.block(Block::Phi2).to_vec());
    let energies = pendulum_energies(state, sim.constants());
    res.energy.push(energies.iter().sum());
    res.pendulum_energy.push(energies);
}
