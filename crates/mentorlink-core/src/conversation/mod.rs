//! Conversation domain module.
//!
//! - `model`: `Conversation`, `Message`, participant pair normalization,
//!   in-call thread ids
//! - `repository`: persistence trait

mod model;
pub mod repository;

pub use model::{Conversation, Message, participant_key, session_conversation_id};
pub use repository::ConversationRepository;
