//! Booking domain model and its status state machine.

use crate::error::{MentorError, Result};
use crate::slot::TimeSlot;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a booking.
///
/// ```text
/// scheduled --join--> in-progress --end--> completed
/// scheduled --cancel--> cancelled
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum BookingStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

/// A user intent that moves a booking along its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum BookingAction {
    Join,
    End,
    Cancel,
}

impl BookingStatus {
    /// Returns the status reached by applying `action`, or `None` when the
    /// edge does not exist.
    pub fn next(self, action: BookingAction) -> Option<BookingStatus> {
        match (self, action) {
            (BookingStatus::Scheduled, BookingAction::Join) => Some(BookingStatus::InProgress),
            (BookingStatus::Scheduled, BookingAction::Cancel) => Some(BookingStatus::Cancelled),
            (BookingStatus::InProgress, BookingAction::End) => Some(BookingStatus::Completed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Scheduled or in-progress bookings hold their slot.
    pub fn holds_slot(self) -> bool {
        !self.is_terminal()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    /// Canonical identifier, shared by the live session, rating and history record.
    pub id: String,
    pub learner_id: String,
    pub volunteer_id: String,
    /// Volunteer display name at booking time.
    pub volunteer_name: String,
    pub topic: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<i64>,
    /// What the learner wants to cover, given at booking time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free-form notes taken during or after the call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Booking {
    pub fn slot(&self) -> TimeSlot {
        TimeSlot::new(self.date, self.time)
    }

    /// Applies `action` in place.
    ///
    /// On an illegal edge the booking is left untouched and an
    /// `InvalidState` error describing the attempt is returned.
    pub fn apply(&mut self, action: BookingAction, now: DateTime<Utc>) -> Result<BookingStatus> {
        let next = self.status.next(action).ok_or_else(|| {
            MentorError::invalid_state(
                "booking",
                &self.id,
                format!("cannot {} a booking that is {}", action, self.status),
            )
        })?;

        match action {
            BookingAction::Join => self.started_at = Some(now),
            BookingAction::End => {
                self.ended_at = Some(now);
                self.duration_secs = self.started_at.map(|start| (now - start).num_seconds().max(0));
            }
            BookingAction::Cancel => {}
        }
        self.status = next;
        self.updated_at = now;
        Ok(next)
    }

    /// Replaces the call notes. Blank text clears them.
    ///
    /// Only a call that has started can carry notes; anything else is
    /// `InvalidState` and leaves the booking untouched.
    pub fn record_notes(&mut self, notes: &str, now: DateTime<Utc>) -> Result<()> {
        if !matches!(self.status, BookingStatus::InProgress | BookingStatus::Completed) {
            return Err(MentorError::invalid_state(
                "booking",
                &self.id,
                format!("cannot take notes on a booking that is {}", self.status),
            ));
        }
        self.notes = non_blank(notes);
        self.updated_at = now;
        Ok(())
    }
}

pub(crate) fn non_blank(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Input for creating a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBooking {
    pub learner_id: String,
    pub volunteer_id: String,
    pub slot: TimeSlot,
    /// Defaults to the volunteer's specialty when absent.
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewBooking {
    pub fn new(learner_id: impl Into<String>, volunteer_id: impl Into<String>, slot: TimeSlot) -> Self {
        Self {
            learner_id: learner_id.into(),
            volunteer_id: volunteer_id.into(),
            slot,
            topic: None,
            description: None,
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
