//! In-memory availability state: building -> room -> scheduled lessons and flags.
//!
//! The store is what callers see. It is built by [`crate::initializer`] once per
//! day and mutated in place by [`crate::refresher`] on every query.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::campus::Coordinates;
use crate::lesson::Interval;

/// A lesson as held by a room: interval plus the cleaned display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledLesson {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub occupant: String,
}

impl ScheduledLesson {
    pub fn interval(&self) -> Interval {
        Interval {
            start: self.start,
            end: self.end,
        }
    }
}

/// Availability of a single room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomState {
    /// Today's in-progress and upcoming lessons, ordered by start.
    pub lessons: Vec<ScheduledLesson>,
    pub free: bool,
    pub available_soon: bool,
}

impl Default for RoomState {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomState {
    /// A room with nothing scheduled: free, not available soon.
    pub fn new() -> Self {
        Self {
            lessons: Vec::new(),
            free: true,
            available_soon: false,
        }
    }

    /// Insert keeping `lessons` ordered by start (stable for equal starts).
    pub fn schedule(&mut self, lesson: ScheduledLesson) {
        let at = self.lessons.partition_point(|l| l.start <= lesson.start);
        self.lessons.insert(at, lesson);
    }

    /// Drop every lesson that has ended by `now`. Returns how many were removed.
    pub fn prune(&mut self, now: NaiveDateTime) -> usize {
        let before = self.lessons.len();
        self.lessons.retain(|l| !l.interval().has_ended(now));
        before - self.lessons.len()
    }

    /// The lesson straddling `now`, if any.
    pub fn current_lesson(&self, now: NaiveDateTime) -> Option<&ScheduledLesson> {
        self.lessons.iter().find(|l| l.interval().contains(now))
    }
}

/// Availability of a building and all its rooms.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingState {
    pub coordinates: Coordinates,
    pub rooms: BTreeMap<String, RoomState>,
    pub free: bool,
    pub available_soon: bool,
    pub closed: bool,
}

impl BuildingState {
    pub fn new(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            rooms: BTreeMap::new(),
            free: false,
            available_soon: false,
            closed: false,
        }
    }

    /// Get or create the state for `room`.
    pub fn room_mut(&mut self, room: &str) -> &mut RoomState {
        self.rooms.entry(room.to_string()).or_default()
    }

    /// Set the building flags from the opening-hours verdict and the room flags.
    ///
    /// A closed building is never free or available soon, whatever its rooms say.
    pub fn roll_up(&mut self, closed: bool) {
        self.closed = closed;
        if closed {
            self.free = false;
            self.available_soon = false;
        } else {
            self.free = self.rooms.values().any(|r| r.free);
            self.available_soon = self.rooms.values().any(|r| r.available_soon);
        }
    }

    pub fn free_rooms(&self) -> impl Iterator<Item = &str> {
        self.rooms
            .iter()
            .filter(|(_, r)| r.free)
            .map(|(name, _)| name.as_str())
    }
}

/// Every building the engine reports on, keyed by building name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AvailabilityStore {
    buildings: BTreeMap<String, BuildingState>,
}

impl AvailabilityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn building(&self, name: &str) -> Option<&BuildingState> {
        self.buildings.get(name)
    }

    pub fn building_mut(&mut self, name: &str) -> Option<&mut BuildingState> {
        self.buildings.get_mut(name)
    }

    /// Get or create the state for `name`, seeding coordinates on first use.
    pub fn building_entry(&mut self, name: &str, coordinates: Coordinates) -> &mut BuildingState {
        self.buildings
            .entry(name.to_string())
            .or_insert_with(|| BuildingState::new(coordinates))
    }

    pub fn room(&self, building: &str, room: &str) -> Option<&RoomState> {
        self.buildings.get(building)?.rooms.get(room)
    }

    pub fn buildings(&self) -> impl Iterator<Item = (&str, &BuildingState)> {
        self.buildings.iter().map(|(name, b)| (name.as_str(), b))
    }

    pub fn buildings_mut(&mut self) -> impl Iterator<Item = (&str, &mut BuildingState)> {
        self.buildings.iter_mut().map(|(name, b)| (name.as_str(), b))
    }

    /// Every `(building, room)` pair in the store.
    pub fn rooms(&self) -> impl Iterator<Item = (&str, &str)> {
        self.buildings.iter().flat_map(|(building, state)| {
            state
                .rooms
                .keys()
                .map(move |room| (building.as_str(), room.as_str()))
        })
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }
}
