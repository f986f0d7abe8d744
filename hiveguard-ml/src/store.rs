//! Model persistence
//!
//! The detector owns an optional [`ModelStore`]. It loads once at
//! construction and saves after each successful training; both are
//! best-effort, and a failing store never blocks detection.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::debug;
use thiserror::Error;

use crate::model::ModelState;

/// Errors raised by model stores
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Model store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model state could not be encoded or decoded: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Model store lock poisoned")]
    Poisoned,
}

/// Load/save boundary for trained model state
pub trait ModelStore: Send + Sync {
    /// Previously saved state, `None` when nothing was saved yet
    fn load(&self) -> Result<Option<ModelState>, StoreError>;

    /// Replace the saved state
    fn save(&self, state: &ModelState) -> Result<(), StoreError>;
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<ModelState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModelStore for MemoryStore {
    fn load(&self) -> Result<Option<ModelState>, StoreError> {
        let slot = self.slot.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(slot.clone())
    }

    fn save(&self, state: &ModelState) -> Result<(), StoreError> {
        let mut slot = self.slot.lock().map_err(|_| StoreError::Poisoned)?;
        *slot = Some(state.clone());
        Ok(())
    }
}

/// JSON file store; writes go to a sibling temporary file and are renamed
/// into place so readers never observe a partial model.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "model".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ModelStore for JsonFileStore {
    fn load(&self) -> Result<Option<ModelState>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)?;
        let state = serde_json::from_str(&text)?;
        debug!("Loaded model state from {}", self.path.display());
        Ok(Some(state))
    }

    fn save(&self, state: &ModelState) -> Result<(), StoreError> {
        let text = serde_json::to_string(state)?;
        let staging = self.staging_path();
        fs::write(&staging, text)?;
        fs::rename(&staging, &self.path)?;
        debug!("Saved model state to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::ForestConfig;
    use crate::model::AnomalyModel;
    use hiveguard_core::FeatureVector;

    fn state() -> ModelState {
        let batch: Vec<FeatureVector> = (0..12)
            .map(|i| FeatureVector::from_values(vec![30.0 + i as f64 * 0.3, 55.0, 40.0 + (i % 3) as f64, 0.5]))
            .collect();
        ModelState::new(AnomalyModel::fit(&batch, 4, ForestConfig::compact()).unwrap())
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());

        let saved = state();
        store.save(&saved).unwrap();
        assert_eq!(store.load().unwrap(), Some(saved));
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("model.json"));
        assert!(store.load().unwrap().is_none());

        let saved = state();
        store.save(&saved).unwrap();
        assert_eq!(store.load().unwrap(), Some(saved));
        assert!(!dir.path().join("model.json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, "{not json").unwrap();

        let store = JsonFileStore::new(path);
        assert!(matches!(store.load(), Err(StoreError::Serialization(_))));
    }

    #[test]
    fn missing_directory_fails_to_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent").join("model.json"));
        assert!(matches!(store.save(&state()), Err(StoreError::Io(_))));
    }
}
