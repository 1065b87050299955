//! Builds a fresh [`AvailabilityStore`] from the day's lessons.
//!
//! Runs once per civil day (or on explicit reload). Lessons in buildings that are
//! closed at load time never enter the store; lessons already over are dropped;
//! the rest are attached to their room with the occupant label cleaned for display.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use tracing::{debug, error, info, warn};

use crate::campus::Campus;
use crate::error::AuleError;
use crate::format::occupant_label;
use crate::hours;
use crate::lesson::{Lesson, AVAILABLE_SOON_HORIZON};
use crate::registry::RoomRegistry;
use crate::store::{AvailabilityStore, ScheduledLesson};

/// Result of an initialization run.
#[derive(Debug)]
pub struct Initialization {
    pub store: AvailabilityStore,
    /// Configuration errors, one per offending building.
    pub errors: Vec<AuleError>,
    /// Lessons dropped for failing validation.
    pub rejected: usize,
}

/// Build the store for `now`'s day from `lessons`.
///
/// Rooms known to `registry` but absent from `lessons` are added as empty rooms
/// for buildings that are open at `now`.
///
/// Buildings missing from `campus` are reported in [`Initialization::errors`] and
/// skipped; every other building is still loaded.
pub fn initialize(
    lessons: &[Lesson],
    campus: &Campus,
    registry: &RoomRegistry,
    now: NaiveDateTime,
) -> Initialization {
    let mut store = AvailabilityStore::new();
    let mut unknown = BTreeSet::new();
    let mut rejected = 0;
    let mut loaded = 0;

    for lesson in lessons {
        if let Err(e) = lesson.validate() {
            warn!(error = %e, "dropping malformed lesson");
            rejected += 1;
            continue;
        }

        let info = match campus.building(&lesson.building) {
            Ok(info) => info,
            Err(_) => {
                unknown.insert(lesson.building.clone());
                continue;
            }
        };

        if hours::is_closed(&info.hours, now) {
            debug!(
                building = %lesson.building,
                room = %lesson.room,
                "skipped lesson in closed building"
            );
            continue;
        }

        let building = store.building_entry(&lesson.building, info.coordinates);
        let room = building.room_mut(&lesson.room);

        let interval = lesson.interval();
        if lesson.start.date() != now.date() || interval.has_ended(now) {
            continue;
        }

        room.schedule(ScheduledLesson {
            start: lesson.start,
            end: lesson.end,
            occupant: occupant_label(&lesson.occupant),
        });
        loaded += 1;

        if interval.contains(now) {
            room.free = false;
        }
        if interval.ends_within(now, AVAILABLE_SOON_HORIZON) {
            room.available_soon = true;
            building.available_soon = true;
        }
    }

    for (key, _) in registry.rooms() {
        let Ok(info) = campus.building(&key.building) else {
            unknown.insert(key.building.clone());
            continue;
        };
        if hours::is_closed(&info.hours, now) {
            continue;
        }
        store
            .building_entry(&key.building, info.coordinates)
            .room_mut(&key.room);
    }

    for (name, building) in store.buildings_mut() {
        let closed = campus.is_closed(name, now).unwrap_or(false);
        building.closed = closed;
        if closed {
            building.free = false;
            building.available_soon = false;
        } else {
            building.free = building.rooms.values().any(|r| r.free);
        }
    }

    let errors: Vec<AuleError> = unknown
        .into_iter()
        .map(|name| {
            error!(building = %name, "building missing from campus catalog");
            AuleError::UnknownBuilding(name)
        })
        .collect();

    info!(
        buildings = store.len(),
        lessons = loaded,
        rejected,
        errors = errors.len(),
        "availability store initialized"
    );

    Initialization {
        store,
        errors,
        rejected,
    }
}
