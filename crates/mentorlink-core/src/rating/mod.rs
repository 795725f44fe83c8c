//! Rating domain module.
//!
//! - `model`: `Rating`, `HistoryRecord`, `HistoryStats`
//! - `repository`: `RatingRepository`, `HistoryRepository`

mod model;
pub mod repository;

pub use model::{HistoryRecord, HistoryStats, MAX_SCORE, MIN_SCORE, Rating, validate_score};
pub use repository::{HistoryRepository, RatingRepository};
