//! Block puzzle game engine
//!
//! This crate provides the game-state engine for a single-player block
//! placement puzzle:
//! - A catalog of 19 fixed piece shapes
//! - A square occupancy board with bounds-checked access
//! - Placement legality and line clearing with quadratic scoring
//! - A game session that refills pieces, detects game over and persists
//!   its state through a pluggable storage collaborator
//!
//! # Architecture
//!
//! Rendering, audio and animation live outside the engine. They read the
//! board, slots and score, call [`GameSession::place_piece`], and react to
//! the returned [`PlaceOutcome`] and its [`GameEvent`]s. The engine can be
//! compiled natively for the WebSocket host or to WebAssembly for an
//! in-browser client.
//!
//! # Modules
//!
//! - [`pieces`]: piece patterns and the shared catalog
//! - [`board`]: occupancy grid
//! - [`placement`]: legality checks and applying a piece
//! - [`lines`]: row and column clearing
//! - [`scoring`]: point values
//! - [`game`]: game state and session
//! - [`storage`]: storage collaborators and the persisted record
//! - [`highscore`]: best score record

pub mod board;
pub mod config;
pub mod error;
pub mod events;
pub mod game;
pub mod highscore;
pub mod lines;
pub mod pieces;
pub mod placement;
pub mod scoring;
pub mod storage;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use board::{Board, DEFAULT_GRID_SIZE};
pub use config::GameConfig;
pub use error::{GameError, StorageError};
pub use events::GameEvent;
pub use game::{
    random_pieces, GameSession, GameState, PieceSlots, PlaceOutcome, Placement,
    NUM_AVAILABLE_PIECES,
};
pub use highscore::{HighScore, HIGHSCORE_KEY};
pub use lines::{detect_and_clear, LineClear};
pub use pieces::{
    catalog_size, shape_for, Catalog, CellOffset, PieceId, PieceShape, CATALOG_SIZE,
    MAX_NUM_PIECE_BLOCKS,
};
pub use placement::{apply_placement, can_place, has_legal_anchor, legal_anchors};
pub use storage::{FileStorage, GameRecord, MemoryStorage, Storage, GAME_STATE_KEY};
