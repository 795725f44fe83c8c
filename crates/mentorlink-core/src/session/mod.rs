//! Session domain module.
//!
//! This module contains the live-call types and the lifecycle events that
//! accompany booking state transitions.
//!
//! # Module Structure
//!
//! - `model`: `SessionHandle`, `LiveSession`, `CompletedSession`
//! - `event`: `LifecycleEvent` published to the display layer

mod event;
mod model;

// Re-export public API
pub use event::LifecycleEvent;
pub use model::{CompletedSession, LiveSession, SessionHandle, format_duration};
