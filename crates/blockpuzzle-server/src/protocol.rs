//! WebSocket protocol messages for the block puzzle host.

use blockpuzzle_core::{GameEvent, GameState, HighScore, PlaceOutcome};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Throw away the current game and start a new one
    NewGame,

    /// Continue a previously saved session
    ResumeGame { session_id: Uuid },

    /// Place the piece in `slot` with its anchor at (`x`, `y`)
    PlacePiece { slot: usize, x: i32, y: i32 },

    /// Request the full game state
    GetState,

    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Welcome message with the session this connection is bound to
    Welcome { session_id: Uuid },

    /// Full game state
    GameState { state: StateView },

    /// Result of a placement request
    PlaceResult(PlaceResultView),

    /// No offered piece fits anywhere
    GameOver {
        score: u64,
        best_score: u64,
        new_best: bool,
    },

    /// Error occurred
    Error { message: String },

    /// Pong response
    Pong,
}

/// Game state for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateView {
    pub grid_size: usize,
    pub occupied_cells: Vec<bool>,
    /// Catalog indices, -1 for a placed piece
    pub available_pieces: Vec<i32>,
    pub score: u64,
    pub best_score: u64,
    pub can_make_move: bool,
}

impl StateView {
    pub fn new(state: &GameState, best: &HighScore) -> Self {
        let record = state.to_record();
        Self {
            grid_size: state.grid_size(),
            occupied_cells: record.occupied_cells,
            available_pieces: record.available_pieces,
            score: record.score,
            best_score: best.local_best,
            can_make_move: state.can_make_move(),
        }
    }
}

/// Placement result for effects and animation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceResultView {
    pub placed: bool,
    pub placed_cells: Vec<usize>,
    pub cleared_cells: Vec<usize>,
    pub lines_cleared: u32,
    pub points: u64,
    pub refilled: bool,
    pub events: Vec<GameEvent>,
}

impl From<&PlaceOutcome> for PlaceResultView {
    fn from(outcome: &PlaceOutcome) -> Self {
        let events = outcome.events();
        match outcome.placement() {
            Some(p) => Self {
                placed: true,
                placed_cells: p.placed_cells.clone(),
                cleared_cells: p.cleared.cells.clone(),
                lines_cleared: p.cleared.lines_cleared(),
                points: p.points,
                refilled: p.refilled,
                events,
            },
            None => Self {
                placed: false,
                placed_cells: Vec::new(),
                cleared_cells: Vec::new(),
                lines_cleared: 0,
                points: 0,
                refilled: false,
                events,
            },
        }
    }
}
