//! WebAssembly bindings for the block puzzle engine.
//!
//! This module exposes a game session to JavaScript through wasm-bindgen.
//! The browser owns persistence: it reads the record with `exportState`
//! after each change and hands it back through `importState` on load.

use wasm_bindgen::prelude::*;

use crate::config::GameConfig;
use crate::game::{GameSession, GameState};
use crate::storage::{GameRecord, MemoryStorage, Storage, GAME_STATE_KEY};

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// WASM-exposed game wrapper
#[wasm_bindgen]
pub struct WasmGame {
    session: GameSession<MemoryStorage>,
}

#[wasm_bindgen]
impl WasmGame {
    /// Start a fresh game on a board of the given size
    #[wasm_bindgen(constructor)]
    pub fn new(grid_size: usize) -> Result<WasmGame, JsValue> {
        let config = GameConfig::new(grid_size).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmGame {
            session: GameSession::new(config, MemoryStorage::new()),
        })
    }

    /// Discard the board and start over
    #[wasm_bindgen(js_name = newGame)]
    pub fn new_game(&mut self) {
        self.session.new_game();
    }

    /// Place a piece, returns the outcome as JSON
    #[wasm_bindgen(js_name = placePiece)]
    pub fn place_piece(&mut self, slot: usize, x: i32, y: i32) -> Result<String, JsValue> {
        let outcome = self
            .session
            .place_piece(slot, x, y)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let json = serde_json::json!({
            "result": outcome,
            "events": outcome.events().iter().map(|e| e.name()).collect::<Vec<_>>(),
        });
        Ok(json.to_string())
    }

    /// Check a drop target while dragging
    #[wasm_bindgen(js_name = canPlacePiece)]
    pub fn can_place_piece(&self, slot: usize, x: i32, y: i32) -> bool {
        self.session.can_place_piece(slot, x, y).unwrap_or(false)
    }

    #[wasm_bindgen(js_name = canMakeMove)]
    pub fn can_make_move(&self) -> bool {
        self.session.can_make_move()
    }

    #[wasm_bindgen(js_name = getScore)]
    pub fn get_score(&self) -> f64 {
        self.session.score() as f64
    }

    /// Get the current game record as JSON (for rendering)
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        serde_json::to_string(&self.session.state().to_record())
            .unwrap_or_else(|_| "{}".to_string())
    }

    /// The record to persist; identical to `getState`
    #[wasm_bindgen(js_name = exportState)]
    pub fn export_state(&self) -> String {
        self.get_state()
    }

    /// Restore a saved record. An unreadable record starts a fresh game and
    /// returns false.
    #[wasm_bindgen(js_name = importState)]
    pub fn import_state(&mut self, json: &str) -> bool {
        let grid_size = self.session.config().grid_size;
        let valid = GameRecord::from_json(json)
            .and_then(|record| GameState::from_record(record, grid_size))
            .is_ok();
        if !valid {
            self.session.new_game();
            return false;
        }

        let mut storage = MemoryStorage::new();
        if storage.save(GAME_STATE_KEY, json).is_err() {
            return false;
        }
        self.session = GameSession::new(*self.session.config(), storage);
        true
    }
}
