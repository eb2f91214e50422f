//! # Pendula Core
//!
//! Numerical core of the double-pendulum simulator. Everything here is pure
//! and allocation-light so it can be driven from any frame loop:
//! - Flat state vector in block layout (`phi1 | p1 | phi2 | p2`)
//! - Hamiltonian equations of motion, evaluated block-wise for N pendulums
//! - Classic fixed-step RK4
//! - Cartesian projection and energy bookkeeping
//! - Run-state machine and the shared single-flight animation lock

pub mod dynamics;
pub mod energy;
pub mod error;
pub mod integrator;
pub mod lock;
pub mod projection;
pub mod state;
pub mod state_machine;

// Re-export core types
pub use dynamics::{derivative, Constants, G};
pub use energy::{pendulum_energies, total_energy};
pub use error::{Result, SimError};
pub use integrator::{rk4_step, FrameStepper, STEPS_PER_FRAME, STEP_SIZE};
pub use lock::AnimationLock;
pub use projection::{project, CartesianFrame};
pub use state::{linspace, Block, StateVector};
pub use state_machine::{FrameDecision, RunState, RunStateMachine, SETTLE_DELAY};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
