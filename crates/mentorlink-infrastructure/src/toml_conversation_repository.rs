//! TOML-backed ConversationRepository implementation.
//!
//! Each conversation is stored together with its messages so that
//! appending a message and updating the thread summary is one document
//! write.

use crate::paths::Collection;
use crate::storage::TomlCollection;
use crate::storage_repository::StorageRepository;
use async_trait::async_trait;
use mentorlink_core::conversation::{
    Conversation, ConversationRepository, Message, participant_key,
};
use mentorlink_core::error::{MentorError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// A conversation and its messages as persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationThread {
    pub conversation: Conversation,
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Stores every thread in `conversations.toml`.
pub struct TomlConversationRepository {
    threads: TomlCollection<ConversationThread>,
}

impl StorageRepository for TomlConversationRepository {
    const COLLECTION: Collection = Collection::Conversations;
    const ENTITY_NAME: &'static str = "conversation";
    type Item = ConversationThread;

    fn from_collection(collection: TomlCollection<ConversationThread>) -> Self {
        Self {
            threads: collection,
        }
    }

    fn collection(&self) -> &TomlCollection<ConversationThread> {
        &self.threads
    }
}

#[async_trait]
impl ConversationRepository for TomlConversationRepository {
    async fn find_by_id(&self, conversation_id: &str) -> Result<Option<Conversation>> {
        Ok(self
            .threads
            .read()
            .await?
            .into_iter()
            .map(|thread| thread.conversation)
            .find(|conversation| conversation.id == conversation_id))
    }

    async fn find_by_participants(
        &self,
        user_a: &str,
        user_b: &str,
    ) -> Result<Option<Conversation>> {
        let key = participant_key(user_a, user_b);
        Ok(self
            .threads
            .read()
            .await?
            .into_iter()
            .map(|thread| thread.conversation)
            .find(|conversation| {
                conversation.participants == key && !conversation.is_session_thread()
            }))
    }

    async fn save(&self, conversation: &Conversation) -> Result<()> {
        let conversation = conversation.clone();
        self.threads
            .modify(move |threads| {
                match threads
                    .iter_mut()
                    .find(|thread| thread.conversation.id == conversation.id)
                {
                    Some(thread) => thread.conversation = conversation,
                    None => threads.push(ConversationThread {
                        conversation,
                        messages: Vec::new(),
                    }),
                }
                Ok(())
            })
            .await
    }

    async fn append_message(&self, conversation: &Conversation, message: &Message) -> Result<()> {
        if message.conversation_id != conversation.id {
            return Err(MentorError::validation(format!(
                "Message belongs to conversation {}, not {}",
                message.conversation_id, conversation.id
            )));
        }

        let conversation = conversation.clone();
        let message = message.clone();
        self.threads
            .modify(move |threads| {
                let thread = threads
                    .iter_mut()
                    .find(|thread| thread.conversation.id == conversation.id)
                    .ok_or_else(|| MentorError::not_found("conversation", &conversation.id))?;
                thread.messages.push(message);
                thread.conversation = conversation;
                Ok(())
            })
            .await
    }

    async fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let mut messages = self
            .threads
            .read()
            .await?
            .into_iter()
            .find(|thread| thread.conversation.id == conversation_id)
            .map(|thread| thread.messages)
            .unwrap_or_default();
        messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(messages)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Conversation>> {
        let mut conversations: Vec<Conversation> = self
            .threads
            .read()
            .await?
            .into_iter()
            .map(|thread| thread.conversation)
            .filter(|conversation| {
                conversation.has_participant(user_id) && !conversation.is_session_thread()
            })
            .collect();
        conversations.sort_by_key(|c| Reverse(c.last_activity()));
        Ok(conversations)
    }
}
