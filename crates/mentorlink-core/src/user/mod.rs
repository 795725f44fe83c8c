//! User domain module.
//!
//! # Module Structure
//!
//! - `model`: `User`, `UserRole`, registration and profile patch types
//! - `validation`: phone / cedula / name format rules
//! - `repository`: persistence trait
//!
//! # Usage
//!
//! ```ignore
//! use mentorlink_core::user::{User, UserRole, ProfilePatch, UserRepository};
//! ```

mod model;
pub mod repository;
pub mod validation;

// Re-export public API
pub use model::{Interest, InterestCategory, NewUser, ProfilePatch, User, UserRole};
pub use repository::UserRepository;
