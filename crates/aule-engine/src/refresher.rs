//! Query-time recomputation of availability flags.
//!
//! Cheap enough to run on every request: it only prunes finished lessons and
//! re-derives flags from what is already in the store. Lessons are never added
//! back, so repeated refreshes as time advances only shrink room schedules.

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::campus::Campus;
use crate::lesson::AVAILABLE_SOON_HORIZON;
use crate::registry::RoomRegistry;
use crate::store::{AvailabilityStore, RoomState};

/// Counters from one refresh pass. Rooms in closed buildings are not counted
/// as free or available soon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub pruned: usize,
    pub free_rooms: usize,
    pub soon_rooms: usize,
}

/// Bring every room and building in `store` up to date with `now`.
///
/// Rooms `registry` does not consider usually open are never reported free.
/// Buildings closed at `now` are never reported free or available soon.
pub fn refresh(
    store: &mut AvailabilityStore,
    campus: &Campus,
    registry: &RoomRegistry,
    now: NaiveDateTime,
) -> RefreshSummary {
    let mut summary = RefreshSummary::default();

    for (name, building) in store.buildings_mut() {
        for (room_name, room) in building.rooms.iter_mut() {
            summary.pruned += refresh_room(room, registry.usually_open(name, room_name), now);
        }

        let closed = match campus.is_closed(name, now) {
            Ok(closed) => closed,
            Err(e) => {
                warn!(building = name, error = %e, "no opening hours, treating as open");
                false
            }
        };
        building.roll_up(closed);

        if !building.closed {
            summary.free_rooms += building.free_rooms().count();
            summary.soon_rooms += building.rooms.values().filter(|r| r.available_soon).count();
        }
    }

    debug!(
        pruned = summary.pruned,
        free_rooms = summary.free_rooms,
        soon_rooms = summary.soon_rooms,
        "availability refreshed"
    );
    summary
}

/// Recompute one room's flags. Returns the number of lessons pruned.
pub fn refresh_room(room: &mut RoomState, usually_open: bool, now: NaiveDateTime) -> usize {
    let pruned = room.prune(now);

    if !usually_open {
        room.free = false;
        room.available_soon = false;
        return pruned;
    }

    room.free = true;
    room.available_soon = false;

    for (i, lesson) in room.lessons.iter().enumerate() {
        let interval = lesson.interval();
        if !interval.contains(now) {
            continue;
        }
        room.free = false;

        if interval.ends_within(now, AVAILABLE_SOON_HORIZON) {
            let continued = room
                .lessons
                .iter()
                .enumerate()
                .any(|(j, next)| j != i && interval.is_continued_by(&next.interval()));
            if !continued {
                room.available_soon = true;
            }
        }
    }

    pruned
}
