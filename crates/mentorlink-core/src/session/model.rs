//! Live call and completed-call summaries.
//!
//! A live session is purely in-memory: it exists between join and end and is
//! never persisted. Ending it yields a [`CompletedSession`], which is what the
//! rating workflow consumes.

use crate::booking::Booking;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Handle returned by `join_session`, passed back to `end_session`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHandle {
    pub booking_id: String,
    pub learner_id: String,
    pub started_at: DateTime<Utc>,
}

/// Runtime state of an ongoing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveSession {
    pub booking_id: String,
    pub learner_id: String,
    pub volunteer_id: String,
    pub volunteer_name: String,
    pub topic: String,
    pub started_at: DateTime<Utc>,
}

impl LiveSession {
    pub fn start(booking: &Booking, started_at: DateTime<Utc>) -> Self {
        Self {
            booking_id: booking.id.clone(),
            learner_id: booking.learner_id.clone(),
            volunteer_id: booking.volunteer_id.clone(),
            volunteer_name: booking.volunteer_name.clone(),
            topic: booking.topic.clone(),
            started_at,
        }
    }

    /// Rebuilds the live state of an `in-progress` booking, e.g. after the
    /// process that joined it exited. `None` if the booking never started.
    pub fn resume(booking: &Booking) -> Option<Self> {
        booking.started_at.map(|started_at| Self::start(booking, started_at))
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            booking_id: self.booking_id.clone(),
            learner_id: self.learner_id.clone(),
            started_at: self.started_at,
        }
    }

    /// Elapsed call time; what the call screen shows as a running counter.
    pub fn duration_tally(&self, now: DateTime<Utc>) -> Duration {
        (now - self.started_at).max(Duration::zero())
    }
}

/// Summary emitted when a call ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedSession {
    pub booking_id: String,
    pub learner_id: String,
    pub volunteer_id: String,
    pub volunteer_name: String,
    pub topic: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_secs: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CompletedSession {
    /// Builds the summary from a booking that has reached `completed`.
    ///
    /// Returns `None` if the booking never recorded its start and end.
    pub fn from_booking(booking: &Booking) -> Option<Self> {
        let started_at = booking.started_at?;
        let ended_at = booking.ended_at?;
        Some(Self {
            booking_id: booking.id.clone(),
            learner_id: booking.learner_id.clone(),
            volunteer_id: booking.volunteer_id.clone(),
            volunteer_name: booking.volunteer_name.clone(),
            topic: booking.topic.clone(),
            date: booking.date,
            time: booking.time,
            started_at,
            ended_at,
            duration_secs: booking
                .duration_secs
                .unwrap_or_else(|| (ended_at - started_at).num_seconds().max(0)),
            description: booking.description.clone(),
            notes: booking.notes.clone(),
        })
    }

    pub fn duration(&self) -> Duration {
        Duration::seconds(self.duration_secs)
    }
}

/// Formats a duration as `MM:SS`, or `H:MM:SS` past the hour.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::seconds(0)), "00:00");
        assert_eq!(format_duration(Duration::seconds(61)), "01:01");
        assert_eq!(format_duration(Duration::seconds(3600)), "1:00:00");
        assert_eq!(format_duration(Duration::seconds(-5)), "00:00");
    }
}
