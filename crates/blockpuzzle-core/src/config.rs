//! Game configuration.

use crate::board::DEFAULT_GRID_SIZE;
use crate::error::GameError;
use serde::{Deserialize, Serialize};

/// Tunable parameters of a game session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    /// Side length of the square board
    pub grid_size: usize,
}

impl GameConfig {
    /// Create a config, rejecting an empty board
    pub fn new(grid_size: usize) -> Result<Self, GameError> {
        if grid_size == 0 {
            return Err(GameError::InvalidConfig(
                "grid size must be at least 1".to_string(),
            ));
        }
        Ok(Self { grid_size })
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
        }
    }
}
