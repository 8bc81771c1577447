//! Game state and session orchestration.
//!
//! [`GameState`] holds the rules: board, offered pieces and score.
//! [`GameSession`] wraps it with a random number generator and a storage
//! collaborator, and writes the full record back after every change.

use crate::board::{Board, DEFAULT_GRID_SIZE};
use crate::config::GameConfig;
use crate::error::{GameError, StorageError};
use crate::events::GameEvent;
use crate::lines::{detect_and_clear, LineClear};
use crate::pieces::{catalog_size, shape_for, PieceId};
use crate::placement::{apply_placement, can_place, has_legal_anchor};
use crate::scoring::{line_clear_points, PLACEMENT_POINTS};
use crate::storage::{GameRecord, Storage, GAME_STATE_KEY};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Number of pieces offered at once
pub const NUM_AVAILABLE_PIECES: usize = 3;

/// The offered pieces; `None` marks a slot whose piece was already placed
pub type PieceSlots = [Option<PieceId>; NUM_AVAILABLE_PIECES];

/// Draw a full set of distinct pieces from the catalog
///
/// Picks uniformly from a shrinking pool, so one batch never repeats a
/// shape. Separate batches may.
pub fn random_pieces<R: Rng>(rng: &mut R) -> PieceSlots {
    let mut pool: Vec<PieceId> = (0..catalog_size()).collect();
    let mut slots = [None; NUM_AVAILABLE_PIECES];
    for slot in slots.iter_mut() {
        let pick = rng.gen_range(0..pool.len());
        *slot = Some(pool.swap_remove(pick));
    }
    slots
}

/// Details of a successful placement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Slot the piece came from
    pub slot: usize,
    /// Catalog index of the placed piece
    pub piece: PieceId,
    /// Board coordinate of the piece's origin
    pub anchor: (i32, i32),
    /// Cells the piece filled
    pub placed_cells: Vec<usize>,
    /// Lines completed by this placement
    pub cleared: LineClear,
    /// Points awarded (placement plus line bonus)
    pub points: u64,
    /// Whether all slots were refilled
    pub refilled: bool,
    /// Whether no move remains afterwards
    pub stuck: bool,
}

/// Result of a placement request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome")]
pub enum PlaceOutcome {
    /// The slot is empty or the piece does not fit there; nothing changed
    Rejected,
    /// The piece was placed
    Placed(Placement),
}

impl PlaceOutcome {
    pub fn is_placed(&self) -> bool {
        matches!(self, PlaceOutcome::Placed(_))
    }

    pub fn placement(&self) -> Option<&Placement> {
        match self {
            PlaceOutcome::Placed(placement) => Some(placement),
            PlaceOutcome::Rejected => None,
        }
    }

    /// Events for the caller's effects, in the order they happened
    pub fn events(&self) -> Vec<GameEvent> {
        match self {
            PlaceOutcome::Rejected => vec![GameEvent::Wrong],
            PlaceOutcome::Placed(placement) => {
                let mut events = vec![GameEvent::Drop];
                if !placement.cleared.is_empty() {
                    events.push(GameEvent::Solved);
                }
                if placement.stuck {
                    events.push(GameEvent::Lose);
                }
                events
            }
        }
    }
}

/// Board, offered pieces and score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    slots: PieceSlots,
    score: u64,
}

impl GameState {
    /// Start a game: empty board, three random pieces, no score
    pub fn new<R: Rng>(config: &GameConfig, rng: &mut R) -> Self {
        Self {
            board: Board::new(config.grid_size),
            slots: random_pieces(rng),
            score: 0,
        }
    }

    /// Assemble a state from explicit parts, checking every slot index
    pub fn from_parts(board: Board, slots: PieceSlots, score: u64) -> Result<Self, GameError> {
        for piece in slots.iter().flatten() {
            shape_for(*piece)?;
        }
        Ok(Self {
            board,
            slots,
            score,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn grid_size(&self) -> usize {
        self.board.size()
    }

    pub fn slots(&self) -> &PieceSlots {
        &self.slots
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Piece offered in a slot, `None` if already placed
    pub fn slot(&self, slot: usize) -> Result<Option<PieceId>, GameError> {
        self.slots
            .get(slot)
            .copied()
            .ok_or(GameError::InvalidIndex {
                index: slot,
                len: NUM_AVAILABLE_PIECES,
            })
    }

    /// Number of slots still holding a piece
    pub fn available_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Whether the piece in `slot` fits at the anchor
    pub fn can_place_piece(&self, slot: usize, x: i32, y: i32) -> Result<bool, GameError> {
        match self.slot(slot)? {
            Some(piece) => Ok(can_place(shape_for(piece)?, x, y, &self.board)),
            None => Ok(false),
        }
    }

    /// Place the piece in `slot` with its anchor at (`x`, `y`)
    ///
    /// Order of effects: fill cells, consume the slot, award placement
    /// points, refill if every slot is now empty, then clear lines and award
    /// the line bonus.
    pub fn place_piece<R: Rng>(
        &mut self,
        slot: usize,
        x: i32,
        y: i32,
        rng: &mut R,
    ) -> Result<PlaceOutcome, GameError> {
        let Some(piece) = self.slot(slot)? else {
            return Ok(PlaceOutcome::Rejected);
        };
        let shape = shape_for(piece)?;
        if !can_place(shape, x, y, &self.board) {
            return Ok(PlaceOutcome::Rejected);
        }

        let placed_cells = apply_placement(shape, x, y, &mut self.board)?;
        self.slots[slot] = None;
        self.score += PLACEMENT_POINTS;

        let refilled = self.slots.iter().all(Option::is_none);
        if refilled {
            self.slots = random_pieces(rng);
            debug!(slots = ?self.slots, "Refilled pieces");
        }

        let cleared = detect_and_clear(&mut self.board);
        let bonus = line_clear_points(cleared.lines_cleared());
        self.score += bonus;
        if !cleared.is_empty() {
            debug!(
                rows = ?cleared.rows,
                columns = ?cleared.columns,
                bonus,
                "Cleared lines"
            );
        }

        Ok(PlaceOutcome::Placed(Placement {
            slot,
            piece,
            anchor: (x, y),
            placed_cells,
            cleared,
            points: PLACEMENT_POINTS + bonus,
            refilled,
            stuck: !self.can_make_move(),
        }))
    }

    /// Whether any offered piece fits anywhere on the board
    pub fn can_make_move(&self) -> bool {
        self.slots
            .iter()
            .flatten()
            .filter_map(|&piece| shape_for(piece).ok())
            .any(|shape| has_legal_anchor(shape, &self.board))
    }

    /// No offered piece fits anywhere; the game is over
    pub fn is_stuck(&self) -> bool {
        !self.can_make_move()
    }

    /// Persisted form of this state
    pub fn to_record(&self) -> GameRecord {
        GameRecord {
            grid_size: Some(self.board.size()),
            occupied_cells: self.board.cells().to_vec(),
            available_pieces: self
                .slots
                .iter()
                .map(|slot| slot.map_or(-1, |piece| piece as i32))
                .collect(),
            score: self.score,
        }
    }
}

impl GameState {
    /// Rebuild a state from its record, validating its structure
    ///
    /// A record without `gridSize` is read as a `default_grid_size` board.
    pub fn from_record(record: GameRecord, default_grid_size: usize) -> Result<Self, StorageError> {
        let grid_size = record.grid_size.unwrap_or(default_grid_size);
        if grid_size == 0 {
            return Err(StorageError::Corrupt("grid size is zero".to_string()));
        }

        let cell_count = record.occupied_cells.len();
        let board = Board::from_cells(grid_size, record.occupied_cells).ok_or_else(|| {
            StorageError::Corrupt(format!(
                "{} cells do not fill a {}x{} board",
                cell_count, grid_size, grid_size
            ))
        })?;

        if record.available_pieces.len() != NUM_AVAILABLE_PIECES {
            return Err(StorageError::Corrupt(format!(
                "expected {} pieces, found {}",
                NUM_AVAILABLE_PIECES,
                record.available_pieces.len()
            )));
        }

        let mut slots = [None; NUM_AVAILABLE_PIECES];
        for (slot, &value) in slots.iter_mut().zip(&record.available_pieces) {
            *slot = match value {
                -1 => None,
                v if v >= 0 && (v as usize) < catalog_size() => Some(v as PieceId),
                v => {
                    return Err(StorageError::Corrupt(format!("invalid piece index {v}")));
                }
            };
        }

        Ok(Self {
            board,
            slots,
            score: record.score,
        })
    }
}

impl TryFrom<GameRecord> for GameState {
    type Error = StorageError;

    fn try_from(record: GameRecord) -> Result<Self, Self::Error> {
        Self::from_record(record, DEFAULT_GRID_SIZE)
    }
}

/// A game bound to a storage collaborator
///
/// Every state change is followed by a full write of the game record. If
/// storage fails once, the session logs a warning and stays in memory for
/// the rest of its life.
pub struct GameSession<S: Storage> {
    config: GameConfig,
    state: GameState,
    storage: S,
    persistence_enabled: bool,
    rng: StdRng,
}

impl<S: Storage> GameSession<S> {
    /// Resume the saved game in `storage`, or start a fresh one
    pub fn new(config: GameConfig, storage: S) -> Self {
        Self::with_rng(config, storage, StdRng::from_entropy())
    }

    /// Like [`GameSession::new`] with a deterministic piece sequence
    pub fn with_seed(config: GameConfig, storage: S, seed: u64) -> Self {
        Self::with_rng(config, storage, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, storage: S, mut rng: StdRng) -> Self {
        let mut persistence_enabled = true;
        let saved = match load_saved(&storage, config.grid_size) {
            Ok(saved) => saved,
            Err(StorageError::Corrupt(reason)) => {
                warn!("Discarding saved game: {}", reason);
                None
            }
            Err(e) => {
                warn!("Failed to load saved game, continuing in memory: {}", e);
                persistence_enabled = false;
                None
            }
        };

        let state = match saved {
            Some(state) => {
                info!(score = state.score(), "Restored saved game");
                state
            }
            None => GameState::new(&config, &mut rng),
        };

        let mut session = Self {
            config,
            state,
            storage,
            persistence_enabled,
            rng,
        };
        session.persist();
        session
    }

    /// Discard the saved game and start over
    pub fn new_game(&mut self) {
        if self.persistence_enabled {
            if let Err(e) = self.storage.remove(GAME_STATE_KEY) {
                self.disable_persistence(&e);
            }
        }

        self.state = GameState::new(&self.config, &mut self.rng);
        info!(grid_size = self.config.grid_size, "Started new game");
        self.persist();
    }

    /// Place the piece in `slot` at (`x`, `y`); see [`GameState::place_piece`]
    pub fn place_piece(&mut self, slot: usize, x: i32, y: i32) -> Result<PlaceOutcome, GameError> {
        let outcome = self.state.place_piece(slot, x, y, &mut self.rng)?;
        if outcome.is_placed() {
            self.persist();
        }
        Ok(outcome)
    }

    pub fn can_place_piece(&self, slot: usize, x: i32, y: i32) -> Result<bool, GameError> {
        self.state.can_place_piece(slot, x, y)
    }

    pub fn can_make_move(&self) -> bool {
        self.state.can_make_move()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn board(&self) -> &Board {
        self.state.board()
    }

    pub fn slots(&self) -> &PieceSlots {
        self.state.slots()
    }

    pub fn score(&self) -> u64 {
        self.state.score()
    }

    pub fn available_count(&self) -> usize {
        self.state.available_count()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// False once a storage failure switched the session to memory only
    pub fn persistence_enabled(&self) -> bool {
        self.persistence_enabled
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn persist(&mut self) {
        if !self.persistence_enabled {
            return;
        }
        let result = self
            .state
            .to_record()
            .to_json()
            .and_then(|json| self.storage.save(GAME_STATE_KEY, &json));
        if let Err(e) = result {
            self.disable_persistence(&e);
        }
    }

    fn disable_persistence(&mut self, err: &StorageError) {
        warn!("Saving disabled for this session: {}", err);
        self.persistence_enabled = false;
    }
}

/// Read and validate the saved game, `Ok(None)` if there is none
fn load_saved<S: Storage + ?Sized>(
    storage: &S,
    grid_size: usize,
) -> Result<Option<GameState>, StorageError> {
    let Some(json) = storage.load(GAME_STATE_KEY)? else {
        return Ok(None);
    };
    let record = GameRecord::from_json(&json)?;
    GameState::from_record(record, grid_size).map(Some)
}
