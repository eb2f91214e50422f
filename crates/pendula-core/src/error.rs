//! Error types shared by the simulator crates.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("integration produced non-finite state at frame {step}")]
    NonFinite { step: u64 },

    #[error("state vector length {0} is not a non-zero multiple of 4")]
    Layout(usize),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
