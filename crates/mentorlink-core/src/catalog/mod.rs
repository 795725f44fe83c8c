//! Volunteer catalog module.
//!
//! - `model`: `VolunteerListing` projection and search matching
//! - `provider`: `CatalogProvider` trait

mod model;
pub mod provider;

pub use model::VolunteerListing;
pub use provider::CatalogProvider;
