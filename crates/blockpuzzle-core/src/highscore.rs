//! Best score record.
//!
//! Stored under its own key, separate from the game record, so starting a
//! new game never touches it.

use crate::error::StorageError;
use crate::storage::Storage;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Key of the stored high score
pub const HIGHSCORE_KEY: &str = "blockpuzzle-score";

/// The local best score and when it was set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighScore {
    pub local_best: u64,
    /// Unix time in milliseconds, -1 if never set
    pub local_best_timestamp: i64,
}

impl Default for HighScore {
    fn default() -> Self {
        Self {
            local_best: 0,
            local_best_timestamp: -1,
        }
    }
}

impl HighScore {
    /// Read the stored record; missing or unreadable data yields the default
    pub fn load<S: Storage + ?Sized>(storage: &S) -> Self {
        let json = match storage.load(HIGHSCORE_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => return Self::default(),
            Err(e) => {
                warn!("Failed to load high score: {}", e);
                return Self::default();
            }
        };
        serde_json::from_str(&json).unwrap_or_else(|e| {
            warn!("Ignoring malformed high score: {}", e);
            Self::default()
        })
    }

    pub fn save<S: Storage + ?Sized>(&self, storage: &mut S) -> Result<(), StorageError> {
        let json = serde_json::to_string(self)?;
        storage.save(HIGHSCORE_KEY, &json)
    }

    /// Record `score` if it beats the current best, stamped with the current time
    pub fn update(&mut self, score: u64) -> bool {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(-1);
        self.update_at(score, now)
    }

    /// Record `score` if strictly greater than the best, with an explicit timestamp
    pub fn update_at(&mut self, score: u64, timestamp_ms: i64) -> bool {
        if score <= self.local_best {
            return false;
        }
        self.local_best = score;
        self.local_best_timestamp = timestamp_ms;
        true
    }

    /// Forget the best score
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
