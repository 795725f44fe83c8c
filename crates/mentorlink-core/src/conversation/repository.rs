//! Conversation repository trait.

use super::model::{Conversation, Message};
use crate::error::Result;
use async_trait::async_trait;

/// Persistence contract for conversation threads and their messages.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn find_by_id(&self, conversation_id: &str) -> Result<Option<Conversation>>;

    /// Looks the direct thread up by its participants, in either order.
    /// In-call threads are never returned.
    async fn find_by_participants(&self, user_a: &str, user_b: &str)
        -> Result<Option<Conversation>>;

    /// Inserts or replaces conversation metadata (not its messages).
    async fn save(&self, conversation: &Conversation) -> Result<()>;

    /// Appends `message` and stores `conversation` (already updated with the
    /// message's denormalized fields) as one write. Either both land or
    /// neither does.
    async fn append_message(&self, conversation: &Conversation, message: &Message) -> Result<()>;

    /// Messages of a thread ordered by timestamp. Unknown threads yield an
    /// empty list.
    async fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>>;

    /// Direct threads a user takes part in, most recent message first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Conversation>>;
}
