//! Booking repository trait.
//!
//! Defines the interface for booking persistence operations.

use super::model::Booking;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for the active booking list.
///
/// Bookings leave this repository when they are archived into history.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Finds a booking by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Booking))`: Booking found
    /// - `Ok(None)`: Booking not found (never created, or already archived)
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, booking_id: &str) -> Result<Option<Booking>>;

    /// Inserts or replaces a booking.
    async fn save(&self, booking: &Booking) -> Result<()>;

    /// Removes a booking. Removing an absent booking is not an error.
    async fn delete(&self, booking_id: &str) -> Result<()>;

    /// Lists every active booking.
    async fn list_all(&self) -> Result<Vec<Booking>>;

    /// Lists a learner's bookings, sorted by date then time ascending.
    async fn list_by_learner(&self, learner_id: &str) -> Result<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self
            .list_all()
            .await?
            .into_iter()
            .filter(|b| b.learner_id == learner_id)
            .collect();
        bookings.sort_by_key(|b| (b.slot(), b.created_at));
        Ok(bookings)
    }

    /// Lists a volunteer's bookings, sorted by date then time ascending.
    async fn list_by_volunteer(&self, volunteer_id: &str) -> Result<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self
            .list_all()
            .await?
            .into_iter()
            .filter(|b| b.volunteer_id == volunteer_id)
            .collect();
        bookings.sort_by_key(|b| (b.slot(), b.created_at));
        Ok(bookings)
    }
}
