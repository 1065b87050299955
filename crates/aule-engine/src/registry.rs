//! Persisted "usually open" flags per room.
//!
//! Rooms appear in the registry the first time a calendar mentions them and are
//! never overwritten afterwards; an operator flips `usually_open` to `false` for
//! rooms that should never be advertised (storage rooms, offices). Rooms the
//! registry has never seen count as not usually open.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AuleError, Result};
use crate::store::AvailabilityStore;

/// Identifies a room across buildings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoomKey {
    pub building: String,
    pub room: String,
}

impl RoomKey {
    pub fn new(building: impl Into<String>, room: impl Into<String>) -> Self {
        Self {
            building: building.into(),
            room: room.into(),
        }
    }
}

/// One persisted registry row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryRow {
    pub building: String,
    pub room: String,
    pub usually_open: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<RegistryRow>", into = "Vec<RegistryRow>")]
pub struct RoomRegistry {
    rooms: BTreeMap<RoomKey, bool>,
    dirty: bool,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn usually_open(&self, building: &str, room: &str) -> bool {
        self.rooms
            .get(&RoomKey::new(building, room))
            .copied()
            .unwrap_or(false)
    }

    /// Record a first sighting of a room. An existing entry is left untouched.
    ///
    /// Returns `true` when the room was new.
    pub fn record_seen(&mut self, building: &str, room: &str, usually_open: bool) -> bool {
        let key = RoomKey::new(building, room);
        if self.rooms.contains_key(&key) {
            return false;
        }
        self.rooms.insert(key, usually_open);
        self.dirty = true;
        true
    }

    /// Record every room in `store` not yet registered. Returns how many were added.
    pub fn observe(&mut self, store: &AvailabilityStore, usually_open: bool) -> usize {
        let mut added = 0;
        for (building, room) in store.rooms() {
            if self.record_seen(building, room, usually_open) {
                info!(building, room, "registered new room");
                added += 1;
            }
        }
        added
    }

    /// Whether rooms were added since the last [`RoomRegistry::mark_saved`].
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn rooms(&self) -> impl Iterator<Item = (&RoomKey, bool)> {
        self.rooms.iter().map(|(key, open)| (key, *open))
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

impl From<Vec<RegistryRow>> for RoomRegistry {
    fn from(rows: Vec<RegistryRow>) -> Self {
        let mut registry = RoomRegistry::new();
        for row in rows {
            registry.record_seen(&row.building, &row.room, row.usually_open);
        }
        registry.mark_saved();
        registry
    }
}

impl From<RoomRegistry> for Vec<RegistryRow> {
    fn from(registry: RoomRegistry) -> Self {
        registry
            .rooms
            .into_iter()
            .map(|(key, usually_open)| RegistryRow {
                building: key.building,
                room: key.room,
                usually_open,
            })
            .collect()
    }
}

/// Where the registry lives between process runs.
pub trait RegistryBackend {
    fn load(&self) -> Result<RoomRegistry>;
    fn save(&self, registry: &RoomRegistry) -> Result<()>;
}

/// Registry kept as a JSON array of [`RegistryRow`]s in a local file.
///
/// A missing file loads as an empty registry.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RegistryBackend for JsonFileBackend {
    fn load(&self) -> Result<RoomRegistry> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(RoomRegistry::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RoomRegistry::new()),
            Err(e) => Err(AuleError::Registry(format!(
                "failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn save(&self, registry: &RoomRegistry) -> Result<()> {
        let json = serde_json::to_string_pretty(registry)?;
        std::fs::write(&self.path, json).map_err(|e| {
            AuleError::Registry(format!("failed to write {}: {}", self.path.display(), e))
        })
    }
}

/// Registry held in process memory. Saves replace the held copy.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    saved: Mutex<RoomRegistry>,
}

impl MemoryBackend {
    pub fn new(registry: RoomRegistry) -> Self {
        Self {
            saved: Mutex::new(registry),
        }
    }

    /// The most recently saved registry.
    pub fn snapshot(&self) -> RoomRegistry {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RegistryBackend for MemoryBackend {
    fn load(&self) -> Result<RoomRegistry> {
        Ok(self.snapshot())
    }

    fn save(&self, registry: &RoomRegistry) -> Result<()> {
        let mut saved = registry.clone();
        saved.mark_saved();
        *self.saved.lock().unwrap_or_else(PoisonError::into_inner) = saved;
        Ok(())
    }
}
