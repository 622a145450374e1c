//! Save/Load: the mission flags as a JSON file
//!
//! The flags live under one fixed key, `MissionFlags`, stored as
//! `<save_dir>/MissionFlags.json`:
//!   - Loaded once when the session starts (defaults if missing or broken)
//!   - Saved immediately on every flag change
//!   - Reset writes a fresh all-false record
//!
//! Without a save directory everything stays in memory.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::game::flags::{MissionFlag, MissionFlags};

/// Lookup key of the flags record
pub const FLAGS_KEY: &str = "MissionFlags";

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode flags: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SaveError>;

// ---------------------------------------------------------------------------
// SaveManager: persistent I/O
// ---------------------------------------------------------------------------

/// Manages the flags file
#[derive(Debug, Clone)]
pub struct SaveManager {
    /// Path to the flags file (None = memory only)
    save_path: Option<PathBuf>,
}

impl SaveManager {
    /// Persist into `save_dir`
    pub fn new(save_dir: &Path) -> Self {
        Self {
            save_path: Some(save_dir.join(format!("{}.json", FLAGS_KEY))),
        }
    }

    /// Keep flags in memory only
    pub fn in_memory() -> Self {
        Self { save_path: None }
    }

    pub fn save_path(&self) -> Option<&Path> {
        self.save_path.as_deref()
    }

    /// Load the flags record, falling back to a fresh one
    pub fn load_flags(&self) -> MissionFlags {
        let Some(path) = &self.save_path else {
            return MissionFlags::default();
        };
        if !path.exists() {
            tracing::info!("No {} record found, starting fresh", FLAGS_KEY);
            return MissionFlags::default();
        }
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<MissionFlags>(&json) {
                Ok(flags) => {
                    tracing::info!("Loaded {} from {}: {:?}", FLAGS_KEY, path.display(), flags);
                    flags
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", path.display(), e);
                    MissionFlags::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                MissionFlags::default()
            }
        }
    }

    /// Write the flags record
    pub fn save_flags(&self, flags: &MissionFlags) -> Result<()> {
        let Some(path) = &self.save_path else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(flags)?;
        std::fs::write(path, json)?;
        tracing::debug!("Saved {} to {}", FLAGS_KEY, path.display());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FlagStore: flags plus write-through persistence
// ---------------------------------------------------------------------------

/// The session's flags; every change is written through to the save manager
#[derive(Debug)]
pub struct FlagStore {
    flags: MissionFlags,
    save: SaveManager,
}

impl FlagStore {
    /// Load-if-missing from the save manager
    pub fn open(save: SaveManager) -> Self {
        let flags = save.load_flags();
        Self { flags, save }
    }

    pub fn flags(&self) -> &MissionFlags {
        &self.flags
    }

    /// Set a flag and persist it. Returns true if it was newly set.
    pub fn set(&mut self, flag: MissionFlag) -> bool {
        if !self.flags.set(flag) {
            return false;
        }
        tracing::info!("Mission flag set: {:?}", flag);
        self.persist();
        true
    }

    /// Reset all flags to false and persist
    pub fn reset(&mut self) {
        self.flags.reset();
        tracing::info!("{} reset", FLAGS_KEY);
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.save.save_flags(&self.flags) {
            tracing::warn!("Could not persist {}: {}", FLAGS_KEY, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let save = SaveManager::new(dir.path());
        assert_eq!(save.load_flags(), MissionFlags::default());
        assert!(save.save_path().unwrap().ends_with("MissionFlags.json"));
    }

    #[test]
    fn flags_survive_a_new_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FlagStore::open(SaveManager::new(dir.path()));
        assert!(store.set(MissionFlag::Forest));
        assert!(!store.set(MissionFlag::Forest));

        let reopened = FlagStore::open(SaveManager::new(dir.path()));
        assert!(reopened.flags().forest);
        assert!(!reopened.flags().room);
    }

    #[test]
    fn reset_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FlagStore::open(SaveManager::new(dir.path()));
        store.set(MissionFlag::Bike);
        store.reset();
        let reopened = FlagStore::open(SaveManager::new(dir.path()));
        assert_eq!(*reopened.flags(), MissionFlags::default());
    }

    #[test]
    fn corrupt_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("MissionFlags.json"), "{ not json").unwrap();
        let store = FlagStore::open(SaveManager::new(dir.path()));
        assert_eq!(*store.flags(), MissionFlags::default());
    }

    #[test]
    fn in_memory_store_never_touches_disk() {
        let mut store = FlagStore::open(SaveManager::in_memory());
        store.set(MissionFlag::Room);
        assert!(store.flags().room);
    }
}
