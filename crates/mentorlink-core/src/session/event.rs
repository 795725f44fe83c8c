use serde::{Deserialize, Serialize};

use super::CompletedSession;
use crate::booking::Booking;

/// Lifecycle notifications published to the display layer.
///
/// Delivery is best-effort: a slow subscriber may miss events, but the state
/// they describe is always readable from the repositories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEvent {
    BookingCreated {
        booking: Booking,
    },
    BookingCancelled {
        booking_id: String,
    },
    SessionStarted {
        booking_id: String,
        learner_id: String,
    },
    /// Triggers the rating prompt.
    SessionEnded {
        session: CompletedSession,
    },
    RatingSubmitted {
        booking_id: String,
        score: u8,
    },
    RatingSkipped {
        booking_id: String,
    },
}

impl LifecycleEvent {
    pub fn booking_id(&self) -> &str {
        match self {
            LifecycleEvent::BookingCreated { booking } => &booking.id,
            LifecycleEvent::BookingCancelled { booking_id }
            | LifecycleEvent::SessionStarted { booking_id, .. }
            | LifecycleEvent::RatingSubmitted { booking_id, .. }
            | LifecycleEvent::RatingSkipped { booking_id } => booking_id,
            LifecycleEvent::SessionEnded { session } => &session.booking_id,
        }
    }
}
