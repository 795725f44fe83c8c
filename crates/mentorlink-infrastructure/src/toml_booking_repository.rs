//! TOML-backed BookingRepository implementation.

use crate::paths::Collection;
use crate::storage::TomlCollection;
use crate::storage_repository::StorageRepository;
use async_trait::async_trait;
use mentorlink_core::booking::{Booking, BookingRepository};
use mentorlink_core::error::Result;

/// Stores the active booking list in `bookings.toml`.
///
/// Archived bookings are deleted from this file once their history
/// record exists.
pub struct TomlBookingRepository {
    bookings: TomlCollection<Booking>,
}

impl StorageRepository for TomlBookingRepository {
    const COLLECTION: Collection = Collection::Bookings;
    const ENTITY_NAME: &'static str = "booking";
    type Item = Booking;

    fn from_collection(collection: TomlCollection<Booking>) -> Self {
        Self {
            bookings: collection,
        }
    }

    fn collection(&self) -> &TomlCollection<Booking> {
        &self.bookings
    }
}

#[async_trait]
impl BookingRepository for TomlBookingRepository {
    async fn find_by_id(&self, booking_id: &str) -> Result<Option<Booking>> {
        Ok(self
            .bookings
            .read()
            .await?
            .into_iter()
            .find(|booking| booking.id == booking_id))
    }

    async fn save(&self, booking: &Booking) -> Result<()> {
        let booking = booking.clone();
        self.bookings
            .modify(move |bookings| {
                match bookings.iter_mut().find(|existing| existing.id == booking.id) {
                    Some(existing) => *existing = booking,
                    None => bookings.push(booking),
                }
                Ok(())
            })
            .await
    }

    async fn delete(&self, booking_id: &str) -> Result<()> {
        let booking_id = booking_id.to_string();
        self.bookings
            .modify(move |bookings| {
                bookings.retain(|booking| booking.id != booking_id);
                Ok(())
            })
            .await
    }

    async fn list_all(&self) -> Result<Vec<Booking>> {
        let mut bookings = self.bookings.read().await?;
        bookings.sort_by_key(|b| (b.slot(), b.created_at));
        Ok(bookings)
    }
}
