//! Hosted game sessions.

use blockpuzzle_core::{
    FileStorage, GameError, GameSession, HighScore, PlaceOutcome, Storage, GAME_STATE_KEY,
};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::protocol::StateView;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found")]
    NotFound,

    #[error("Invalid move: {0}")]
    InvalidMove(#[from] GameError),
}

/// Final result sent when a game runs out of moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOver {
    pub score: u64,
    pub best_score: u64,
    pub new_best: bool,
}

/// The best score across all sessions, saved at the save root.
///
/// Reads and updates hold one lock, so a lower final score can never
/// overwrite a higher one saved by another session.
pub struct ScoreBoard {
    storage: Mutex<FileStorage>,
}

impl ScoreBoard {
    pub fn new(save_dir: &Path) -> Self {
        Self {
            storage: Mutex::new(FileStorage::new(save_dir)),
        }
    }

    pub fn best(&self) -> HighScore {
        HighScore::load(&*self.lock())
    }

    /// Offer a final score; returns the resulting best and whether it rose
    pub fn record(&self, score: u64) -> (HighScore, bool) {
        let mut storage = self.lock();
        let mut best = HighScore::load(&*storage);
        let new_best = best.update(score);
        if new_best {
            if let Err(e) = best.save(&mut *storage) {
                warn!("Failed to save high score: {}", e);
            }
        }
        (best, new_best)
    }

    fn lock(&self) -> MutexGuard<'_, FileStorage> {
        // The guarded store holds no invariant a panicking holder could break
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One player's game, saved under `<save_dir>/<id>/`.
pub struct PlayerSession {
    pub id: Uuid,
    game: GameSession<FileStorage>,
    scores: Arc<ScoreBoard>,
    best: HighScore,
}

impl PlayerSession {
    /// Resume the session saved under `id`, or start a new one there
    pub fn open(id: Uuid, config: &ServerConfig, scores: Arc<ScoreBoard>) -> Self {
        let storage = FileStorage::new(config.save_dir.join(id.to_string()));
        let game = GameSession::new(config.game, storage);
        let best = scores.best();
        info!(%id, score = game.score(), "Opened session");

        Self {
            id,
            game,
            scores,
            best,
        }
    }

    /// Whether a saved game exists for `id`
    pub fn has_saved_game(id: Uuid, config: &ServerConfig) -> bool {
        FileStorage::new(config.save_dir.join(id.to_string()))
            .load(GAME_STATE_KEY)
            .map(|saved| saved.is_some())
            .unwrap_or(false)
    }

    pub fn score(&self) -> u64 {
        self.game.score()
    }

    pub fn view(&self) -> StateView {
        StateView::new(self.game.state(), &self.best)
    }

    pub fn new_game(&mut self) {
        self.game.new_game();
    }

    /// Place a piece; a placement that leaves no move ends the game
    pub fn place_piece(
        &mut self,
        slot: usize,
        x: i32,
        y: i32,
    ) -> Result<(PlaceOutcome, Option<GameOver>), SessionError> {
        let outcome = self.game.place_piece(slot, x, y)?;
        let game_over = match outcome.placement() {
            Some(placement) if placement.stuck => Some(self.finish()),
            _ => None,
        };
        Ok((outcome, game_over))
    }

    /// Record the final score against the shared best
    fn finish(&mut self) -> GameOver {
        let score = self.score();
        let (best, new_best) = self.scores.record(score);
        self.best = best;
        info!(id = %self.id, score, new_best, "Game over");

        GameOver {
            score,
            best_score: best.local_best,
            new_best,
        }
    }
}
