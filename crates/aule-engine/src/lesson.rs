//! Lesson records -- the normalized input unit supplied by the calendar collaborator.
//!
//! Timestamps are civil time at the campus, already converted from the feed's UTC
//! values and already filtered to a single day.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{AuleError, Result};

/// A lesson ending within this horizon marks its room as available soon.
pub const AVAILABLE_SOON_HORIZON: Duration = Duration::minutes(30);

/// Gaps after a lesson's end at which a following lesson counts as a continuation.
pub const CONTINUATION_GAPS: [Duration; 2] = [Duration::zero(), Duration::minutes(15)];

/// One scheduled occupancy of a room, as delivered by the calendar feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub room: String,
    pub building: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Raw occupant text (lecturer names) straight from the feed.
    #[serde(default)]
    pub occupant: String,
}

impl Lesson {
    pub fn new(
        room: impl Into<String>,
        building: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
        occupant: impl Into<String>,
    ) -> Self {
        Self {
            room: room.into(),
            building: building.into(),
            start,
            end,
            occupant: occupant.into(),
        }
    }

    /// Check the record is usable: non-empty room and building, `start < end`.
    ///
    /// # Errors
    /// Returns `AuleError::InvalidLesson` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let reason = if self.room.trim().is_empty() {
            "missing room"
        } else if self.building.trim().is_empty() {
            "missing building"
        } else if self.start >= self.end {
            "start is not before end"
        } else {
            return Ok(());
        };
        Err(AuleError::InvalidLesson {
            building: self.building.clone(),
            room: self.room.clone(),
            reason: reason.to_string(),
        })
    }

    pub fn interval(&self) -> Interval {
        Interval {
            start: self.start,
            end: self.end,
        }
    }
}

/// A closed civil-time interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    /// Whether the interval straddles `now`. Both endpoints count as in progress.
    pub fn contains(&self, now: NaiveDateTime) -> bool {
        self.start <= now && now <= self.end
    }

    /// Whether the interval has ended by `now`.
    pub fn has_ended(&self, now: NaiveDateTime) -> bool {
        self.end <= now
    }

    /// Whether the interval ends no later than `horizon` after `now`.
    pub fn ends_within(&self, now: NaiveDateTime, horizon: Duration) -> bool {
        self.end - now <= horizon
    }

    /// Whether `next` begins exactly at this interval's end or one of the
    /// [`CONTINUATION_GAPS`] after it.
    pub fn is_continued_by(&self, next: &Interval) -> bool {
        CONTINUATION_GAPS
            .iter()
            .any(|gap| next.start == self.end + *gap)
    }
}
