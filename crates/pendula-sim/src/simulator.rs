//! Frame-driven orchestration of a batch of double pendulums.

use crate::config::{ConfigChange, SimulationConfig};
use crate::init::initial_state;
use crate::trail::Trails;
use pendula_core::{
    project, total_energy, AnimationLock, CartesianFrame, Constants, FrameDecision, FrameStepper,
    Result, RunState, RunStateMachine, SimError, StateVector,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Everything a renderer needs for one displayed frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    /// Frames integrated since the last restart, counting this one.
    pub step: u64,
    pub time: f64,
    pub view_scale: f64,
    pub frames: Vec<CartesianFrame>,
    /// Lower-bob trail per pendulum; empty when trails are off.
    pub trails: Vec<Vec<[f64; 2]>>,
}

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

/// Owns the state of N pendulums and steps it one displayed frame at a time.
///
/// The host drives it: [`start`](Self::start), [`stop`](Self::stop) and
/// [`restart`](Self::restart) come from the UI, [`poll`](Self::poll) from the
/// refresh signal. Only one simulator per [`AnimationLock`] may be stepping.
pub struct PendulumSimulator {
    config: SimulationConfig,
    pending: Option<SimulationConfig>,
    constants: Constants,
    view_scale: f64,
    stepper: FrameStepper,

    state: StateVector,
    initial: StateVector,
    frames: Vec<CartesianFrame>,
    time: f64,
    step: u64,
    trails: Trails,

    machine: RunStateMachine,
    lock: AnimationLock,
    rng: StdRng,
}

impl PendulumSimulator {
    /// Seeded from `config.seed` when set, otherwise from OS entropy.
    pub fn new(config: SimulationConfig, lock: AnimationLock) -> Result<Self> {
        let rng = seeded_rng(config.seed);
        Self::with_rng(config, lock, rng)
    }

    pub fn with_rng(config: SimulationConfig, lock: AnimationLock, rng: StdRng) -> Result<Self> {
        config.validate()?;
        let constants = config.constants();
        let n = config.pendulum_number;
        let mut sim = Self {
            view_scale: config.view_scale(),
            trails: Trails::new(n, 0, 1, false),
            state: StateVector::zeros(n),
            initial: StateVector::zeros(n),
            frames: Vec::new(),
            config,
            pending: None,
            constants,
            stepper: FrameStepper::default(),
            time: 0.0,
            step: 0,
            machine: RunStateMachine::default(),
            lock,
            rng,
        };
        sim.reinitialize();
        Ok(sim)
    }

    // =====================================================================
    // ACCESSORS
    // =====================================================================
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn constants(&self) -> &Constants {
        &self.constants
    }

    pub fn state(&self) -> &StateVector {
        &self.state
    }

    pub fn initial_state(&self) -> &StateVector {
        &self.initial
    }

    pub fn frames(&self) -> &[CartesianFrame] {
        &self.frames
    }

    pub fn trails(&self) -> &Trails {
        &self.trails
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn view_scale(&self) -> f64 {
        self.view_scale
    }

    pub fn run_state(&self) -> RunState {
        self.machine.current_state()
    }

    pub fn is_running(&self) -> bool {
        self.machine.current_state() == RunState::Running
    }

    /// A frame is pending, which means this simulator holds the lock.
    pub fn holds_lock(&self) -> bool {
        self.machine.frame_scheduled()
    }

    pub fn energy(&self) -> f64 {
        total_energy(&self.state, &self.constants)
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            step: self.step,
            time: self.time,
            view_scale: self.view_scale,
            frames: self.frames.clone(),
            trails: self.trails.snapshot(),
        }
    }

    // =====================================================================
    // LIFECYCLE
    // =====================================================================

    /// Begin animating. No-op when already running or when another
    /// simulator sharing the lock is in flight. Returns whether it started.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        // A frame still pending from before a stop already owns the lock.
        if !self.machine.frame_scheduled() && !self.lock.try_acquire() {
            debug!("start ignored: animation lock held elsewhere");
            return false;
        }
        self.machine.run();
        debug!(pendulums = self.config.pendulum_number, "simulation running");
        true
    }

    /// Stop after the pending frame, if any, observes it.
    pub fn stop(&mut self) {
        if self.machine.current_state() != RunState::Idle {
            debug!(state = self.run_state().label(), "simulation stopping");
        }
        self.machine.stop();
    }

    /// Stop, rebuild the pendulums, and start again once the settling delay
    /// has passed (checked by [`poll`](Self::poll)).
    pub fn restart(&mut self, now: Duration) {
        self.stop();
        self.reinitialize();
        self.machine.begin_restart(now);
        debug!(at = ?now, "simulation restarting");
    }

    /// Stage a new configuration. Nothing changes until
    /// [`apply_changes`](Self::apply_changes).
    pub fn update_config(&mut self, config: SimulationConfig) -> Result<()> {
        config.validate()?;
        self.pending = Some(config);
        Ok(())
    }

    /// Adopt the staged configuration.
    ///
    /// New lengths or masses restart the run. A new pendulum count rebuilds
    /// the state in place. Initial angles, deviation and trail settings wait
    /// for the next rebuild.
    pub fn apply_changes(&mut self, now: Duration) -> ConfigChange {
        let Some(next) = self.pending.take() else {
            return ConfigChange::default();
        };
        let change = next.diff(&self.config);
        if next.seed != self.config.seed {
            // Draws from the new seed start at the next rebuild
            self.rng = seeded_rng(next.seed);
        }
        self.config = next;

        if change.lengths {
            self.view_scale = self.config.view_scale();
        }
        if change.needs_restart() {
            self.constants = self.config.constants();
            self.restart(now);
        } else if change.pendulum_number {
            self.reinitialize();
            debug!(pendulums = self.config.pendulum_number, "state rebuilt");
        }
        change
    }

    // =====================================================================
    // FRAME LOOP
    // =====================================================================

    /// Host refresh callback: fire a due restart, then run the pending frame.
    pub fn poll(&mut self, now: Duration) -> Result<Option<FrameSnapshot>> {
        if self.machine.restart_due(now) {
            self.start();
        }
        self.frame()
    }

    /// Run one scheduled frame: 32 RK4 sub-steps, projection, trails.
    ///
    /// Returns `None` when no frame was pending or the loop had been stopped
    /// (the lock is released then). Non-finite state halts the loop.
    pub fn frame(&mut self) -> Result<Option<FrameSnapshot>> {
        match self.machine.on_frame() {
            FrameDecision::Skip => Ok(None),
            FrameDecision::Release => {
                self.lock.release();
                debug!(step = self.step, "animation lock released");
                Ok(None)
            }
            FrameDecision::Advance => {
                let next = self.stepper.advance(self.time, &self.state, &self.constants);
                if !next.is_finite() {
                    warn!(step = self.step, "non-finite state, halting simulation");
                    if self.machine.halt() {
                        self.lock.release();
                    }
                    return Err(SimError::NonFinite { step: self.step });
                }
                self.state = next;
                self.time += self.stepper.frame_duration();
                self.frames = project(&self.state, &self.constants);
                self.trails.on_frame(self.step, &self.frames);
                self.step += 1;
                Ok(Some(self.snapshot()))
            }
        }
    }

    fn reinitialize(&mut self) {
        let c = &self.config;
        self.state = initial_state(c, &mut self.rng);
        self.initial = self.state.clone();
        self.frames = project(&self.state, &self.constants);
        self.time = 0.0;
        self.step = 0;
        self.trails = Trails::new(
            c.pendulum_number,
            c.trail_length,
            c.trail_update_interval,
            c.trails,
        );
        self.trails.reset(&self.frames);
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut StateVector {
        &mut self.state
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

impl Drop for PendulumSimulator {
    fn drop(&mut self) {
        if self.machine.halt() {
            self.lock.release();
        }
    }
}
