//! Error types for the game engine.
//!
//! Illegal moves are not errors: they come back as
//! [`PlaceOutcome::Rejected`](crate::game::PlaceOutcome::Rejected). The
//! variants here are reserved for caller bugs and storage trouble.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by invalid (programmer) input to the engine
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Index {index} is out of range (valid: 0..{len})")]
    InvalidIndex { index: usize, len: usize },

    #[error("Cell ({x}, {y}) is outside the {size}x{size} board")]
    OutOfBounds { x: i32, y: i32, size: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors raised while reading or writing persisted state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The backing store could not be read or written
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// A stored record exists but failed parsing or validation
    #[error("Corrupt saved state: {0}")]
    Corrupt(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Unavailable(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Corrupt(err.to_string())
    }
}
