//! Booking domain module.
//!
//! - `model`: `Booking`, `BookingStatus` state machine, `NewBooking`
//! - `repository`: persistence trait for the active booking list

mod model;
pub mod repository;

pub use model::{Booking, BookingAction, BookingStatus, NewBooking};
pub use repository::BookingRepository;
