//! Calendar slot value object.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A date plus a start time, e.g. `2025-01-20 14:00`.
///
/// Volunteers offer slots; bookings occupy them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeSlot {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl TimeSlot {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }

    /// Parses `YYYY-MM-DD` and `HH:MM` (seconds optional).
    pub fn parse(date: &str, time: &str) -> Option<Self> {
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()?;
        let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(time.trim(), "%H:%M:%S"))
            .ok()?;
        Some(Self { date, time })
    }

    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// Two slots of `length_minutes` each overlap when their starts are
    /// closer than one slot length.
    pub fn overlaps(&self, other: &TimeSlot, length_minutes: u32) -> bool {
        let gap = (self.starts_at() - other.starts_at()).num_minutes().abs();
        gap < i64::from(length_minutes)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date.format("%Y-%m-%d"), self.time.format("%H:%M"))
    }
}
