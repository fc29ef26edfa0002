use crate::creature::Team;
use crate::errors::{StoreError, StoreResult};
use schema::Species;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const STARTER_KEY: &str = "starter";
pub const TEAM_KEY: &str = "team";

/// Flat string key-value storage for one save slot.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;
}

/// In-memory store. Nothing outlives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a single JSON object file mapping keys to string values.
/// Every `set` rewrites the whole file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> StoreResult<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(source) => Err(StoreError::ReadFailed {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        // A corrupt file is replaced rather than blocking every future save.
        let mut entries = self.read_entries().unwrap_or_else(|err| {
            warn!(path = ?self.path, error = %err, "discarding unreadable save file");
            BTreeMap::new()
        });
        entries.insert(key.to_string(), value.to_string());
        let contents = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, contents).map_err(|source| StoreError::WriteFailed {
            path: self.path.clone(),
            source,
        })
    }
}

/// Everything persisted for one player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveState {
    pub starter: Option<Species>,
    pub team: Team,
}

impl SaveState {
    /// True once a starter has been chosen and the team holds it.
    pub fn has_started(&self) -> bool {
        self.starter.is_some() && !self.team.is_empty()
    }
}

/// Save-slot persistence over a key-value backend.
///
/// Starter and team live under separate keys and are written independently.
/// A crash between `save_starter` and `save_team` leaves a new starter next to
/// the previous team.
#[derive(Debug, Clone)]
pub struct SaveStore<S: KeyValueStore> {
    backend: S,
}

impl<S: KeyValueStore> SaveStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Strict load: absent keys default, unreadable or corrupt data is an error.
    pub fn try_load(&self) -> StoreResult<SaveState> {
        let starter = match self.backend.get(STARTER_KEY)? {
            Some(raw) => Some(Species::from_name(&raw).ok_or_else(|| StoreError::CorruptEntry {
                key: STARTER_KEY.to_string(),
                reason: format!("unknown species '{}'", raw),
            })?),
            None => None,
        };

        let team = match self.backend.get(TEAM_KEY)? {
            Some(raw) => {
                let mut team: Team = serde_json::from_str(&raw)?;
                team.clamp_all();
                team
            }
            None => Team::default(),
        };

        Ok(SaveState { starter, team })
    }

    /// Load, degrading each unreadable entry to its default.
    pub fn load(&self) -> SaveState {
        match self.try_load() {
            Ok(state) => state,
            Err(err) => {
                warn!(error = %err, "save data unreadable, falling back per entry");
                SaveState {
                    starter: self.load_starter_or_default(),
                    team: self.load_team_or_default(),
                }
            }
        }
    }

    fn load_starter_or_default(&self) -> Option<Species> {
        match self.backend.get(STARTER_KEY) {
            Ok(Some(raw)) => Species::from_name(&raw),
            _ => None,
        }
    }

    fn load_team_or_default(&self) -> Team {
        match self.backend.get(TEAM_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<Team>(&raw)
                .map(|mut team| {
                    team.clamp_all();
                    team
                })
                .unwrap_or_default(),
            _ => Team::default(),
        }
    }

    pub fn save_starter(&mut self, starter: Species) -> StoreResult<()> {
        debug!(%starter, "saving starter");
        self.backend.set(STARTER_KEY, starter.name())
    }

    pub fn save_team(&mut self, team: &Team) -> StoreResult<()> {
        debug!(members = team.len(), "saving team");
        let raw = serde_json::to_string(team)?;
        self.backend.set(TEAM_KEY, &raw)
    }

    /// Write both entries, starter first.
    pub fn save(&mut self, state: &SaveState) -> StoreResult<()> {
        if let Some(starter) = state.starter {
            self.save_starter(starter)?;
        }
        self.save_team(&state.team)
    }
}
