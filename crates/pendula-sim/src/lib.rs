//! Pendula Simulation Library
//!
//! Configuration, batch initialisation, trails and the frame-driven
//! simulator that ties the numerical core to a host refresh loop.

pub mod batch;
pub mod config;
pub mod init;
pub mod params;
pub mod simulator;
pub mod trail;

// Re-export main types
pub use batch::{run_batch, BatchResult};
pub use config::{ConfigChange, SimulationConfig, DEFAULT_RANDOMNESS};
pub use init::{init_pendulums, initial_state};
pub use params::*;
pub use simulator::{FrameSnapshot, PendulumSimulator};
pub use trail::{TrailBuffer, Trails};
