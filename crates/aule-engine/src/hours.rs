//! Opening-hours policy -- decides whether a building is closed at a given civil time.
//!
//! A building's hours are a list of [`HoursRule`]s. The first rule whose `days`
//! contains the weekday being checked decides; a weekday no rule mentions is open.
//! Ranges are half-open: a building opening at 07:30 and closing at 20:00 is open
//! at 07:30 and closed at 20:00.

use std::fmt;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

pub const MON_FRI: &[Weekday] = &[
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];
pub const MON_SAT: &[Weekday] = &[
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];
pub const SATURDAY: &[Weekday] = &[Weekday::Sat];
pub const SUNDAY: &[Weekday] = &[Weekday::Sun];

/// A wall-clock time of day at minute precision, `00:00` through `24:00` inclusive.
///
/// `24:00` exists so that "open until midnight" can be written as a close time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u16);

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime(0);
    pub const END_OF_DAY: ClockTime = ClockTime(24 * 60);

    /// Build from hour and minute. Out-of-range values are clamped to `24:00`.
    pub const fn hm(hour: u16, minute: u16) -> Self {
        let minutes = hour as u32 * 60 + minute as u32;
        if minutes > 24 * 60 {
            Self::END_OF_DAY
        } else {
            ClockTime(minutes as u16)
        }
    }

    /// The clock time of a civil timestamp, seconds truncated.
    pub fn of(at: NaiveDateTime) -> Self {
        ClockTime((at.hour() * 60 + at.minute()) as u16)
    }

    pub fn minutes(self) -> u16 {
        self.0
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let (hour, minute) = value
            .split_once(':')
            .ok_or_else(|| format!("expected HH:MM, got '{}'", value))?;
        let hour: u16 = hour
            .trim()
            .parse()
            .map_err(|_| format!("invalid hour in '{}'", value))?;
        let minute: u16 = minute
            .trim()
            .parse()
            .map_err(|_| format!("invalid minute in '{}'", value))?;
        if hour > 24 || minute >= 60 || hour * 60 + minute > 24 * 60 {
            return Err(format!("clock time out of range: '{}'", value));
        }
        Ok(ClockTime(hour * 60 + minute))
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

/// Opening interval `[open, close)` within a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenRange {
    pub open: ClockTime,
    pub close: ClockTime,
}

impl OpenRange {
    pub fn contains(&self, time: ClockTime) -> bool {
        self.open <= time && time < self.close
    }
}

/// Opening hours for a set of weekdays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoursRule {
    pub days: Vec<Weekday>,
    /// `None` means closed all day on `days`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<OpenRange>,
}

impl HoursRule {
    pub fn open(days: &[Weekday], open: ClockTime, close: ClockTime) -> Self {
        Self {
            days: days.to_vec(),
            hours: Some(OpenRange { open, close }),
        }
    }

    pub fn closed(days: &[Weekday]) -> Self {
        Self {
            days: days.to_vec(),
            hours: None,
        }
    }

    pub fn applies_to(&self, day: Weekday) -> bool {
        self.days.contains(&day)
    }
}

/// Whether a building governed by `rules` is closed at `at`.
///
/// An empty rule list, or a weekday none of the rules mention, means open.
pub fn is_closed(rules: &[HoursRule], at: NaiveDateTime) -> bool {
    let day = at.weekday();
    match rules.iter().find(|rule| rule.applies_to(day)) {
        Some(HoursRule {
            hours: Some(range), ..
        }) => !range.contains(ClockTime::of(at)),
        Some(HoursRule { hours: None, .. }) => true,
        None => false,
    }
}
