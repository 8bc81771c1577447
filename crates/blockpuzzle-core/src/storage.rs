//! Persistence collaborators.
//!
//! Storage is a flat string-keyed store, the same shape as browser local
//! storage, so the game record and the high score can live side by side
//! under different keys. Values are JSON documents.

use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Distinguishes temp files of concurrent writers in one process
static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Key of the saved game record
pub const GAME_STATE_KEY: &str = "blockpuzzle-game-state";

/// A string-keyed value store
pub trait Storage {
    /// Read a value, `None` if the key was never written
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite a value
    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-process storage, lost when dropped
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.values.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Store files under `dir`; the directory is created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        // Write then rename so a crash never leaves a half-written record
        let path = self.path_for(key);
        let sequence = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let tmp = self
            .dir
            .join(format!("{key}.{}.{sequence}.tmp", std::process::id()));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// The persisted form of a game
///
/// Slots use `-1` for a consumed piece. Older records may omit `gridSize`;
/// the loader then assumes the configured size. Structural checks (cell count,
/// slot count, index range) happen when converting into a
/// [`GameState`](crate::game::GameState).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_size: Option<usize>,
    pub occupied_cells: Vec<bool>,
    pub available_pieces: Vec<i32>,
    pub score: u64,
}

impl GameRecord {
    pub fn to_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "blockpuzzle-storage-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_memory_storage() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.load("a").unwrap(), None);

        storage.save("a", "1").unwrap();
        storage.save("a", "2").unwrap();
        assert_eq!(storage.load("a").unwrap().as_deref(), Some("2"));
        assert_eq!(storage.len(), 1);

        storage.remove("a").unwrap();
        storage.remove("a").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn test_file_storage() {
        let dir = temp_dir("roundtrip");
        let mut storage = FileStorage::new(&dir);
        assert_eq!(storage.load(GAME_STATE_KEY).unwrap(), None);

        storage.save(GAME_STATE_KEY, "{\"x\":1}").unwrap();
        assert!(dir.join("blockpuzzle-game-state.json").exists());
        assert_eq!(
            storage.load(GAME_STATE_KEY).unwrap().as_deref(),
            Some("{\"x\":1}")
        );

        storage.remove(GAME_STATE_KEY).unwrap();
        assert_eq!(storage.load(GAME_STATE_KEY).unwrap(), None);
        storage.remove(GAME_STATE_KEY).unwrap();

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_file_storage_concurrent_writers() {
        let dir = temp_dir("writers");
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let mut storage = FileStorage::new(&dir);
                std::thread::spawn(move || {
                    for round in 0..20 {
                        storage.save("shared", &format!("{i}-{round}")).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let value = FileStorage::new(&dir).load("shared").unwrap().unwrap();
        assert!(value.ends_with("-19"));
        // Every temp file was renamed into place
        let leftovers = fs::read_dir(&dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "tmp"))
            .count();
        assert_eq!(leftovers, 0);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_record_uses_camel_case() {
        let record = GameRecord {
            grid_size: Some(2),
            occupied_cells: vec![true, false, false, true],
            available_pieces: vec![0, -1, 18],
            score: 25,
        };
        let json = record.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"gridSize":2,"occupiedCells":[true,false,false,true],"availablePieces":[0,-1,18],"score":25}"#
        );
        assert_eq!(GameRecord::from_json(&json).unwrap(), record);
    }

    #[test]
    fn test_record_requires_core_fields() {
        let missing_cells = r#"{"gridSize":10,"availablePieces":[0,1,2],"score":0}"#;
        assert!(matches!(
            GameRecord::from_json(missing_cells),
            Err(StorageError::Corrupt(_))
        ));

        let text_score = r#"{"occupiedCells":[],"availablePieces":[],"score":"12"}"#;
        assert!(GameRecord::from_json(text_score).is_err());
    }

    #[test]
    fn test_record_grid_size_is_optional() {
        let json = r#"{"occupiedCells":[],"availablePieces":[],"score":3}"#;
        let record = GameRecord::from_json(json).unwrap();
        assert_eq!(record.grid_size, None);
        assert_eq!(record.to_json().unwrap(), json);
    }
}
