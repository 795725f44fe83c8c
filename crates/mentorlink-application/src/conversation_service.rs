//! Conversation threads, messages and the simulated auto-reply.

use mentorlink_core::clock::Clock;
use mentorlink_core::config::AutoReplySettings;
use mentorlink_core::conversation::{
    Conversation, ConversationRepository, Message, session_conversation_id,
};
use mentorlink_core::error::{MentorError, Result};
use mentorlink_core::session::LiveSession;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// The result of [`ConversationService::send_message`].
#[derive(Debug)]
pub struct SentMessage {
    pub message: Message,
    /// The pending auto-reply, if one was scheduled. Dropping the handle
    /// does not cancel the reply.
    pub auto_reply: Option<JoinHandle<()>>,
}

#[derive(Clone)]
pub struct ConversationService {
    conversations: Arc<dyn ConversationRepository>,
    clock: Arc<dyn Clock>,
    auto_reply: AutoReplySettings,
    /// Serializes read-modify-write of conversation summaries.
    lock: Arc<Mutex<()>>,
}

impl ConversationService {
    pub fn new(
        conversations: Arc<dyn ConversationRepository>,
        clock: Arc<dyn Clock>,
        auto_reply: AutoReplySettings,
    ) -> Self {
        Self {
            conversations,
            clock,
            auto_reply,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Returns the thread between two users, creating an empty one if absent.
    pub async fn get_or_create_conversation(&self, user_a: &str, user_b: &str) -> Result<Conversation> {
        let _guard = self.lock.lock().await;

        if let Some(existing) = self.conversations.find_by_participants(user_a, user_b).await? {
            return Ok(existing);
        }

        let conversation = Conversation::new(user_a, user_b, self.clock.now())?;
        self.conversations.save(&conversation).await?;
        tracing::debug!(conversation_id = %conversation.id, "Conversation created");
        Ok(conversation)
    }

    /// Returns the in-call thread of `session`, creating it on first use.
    pub async fn get_or_create_session_thread(&self, session: &LiveSession) -> Result<Conversation> {
        let _guard = self.lock.lock().await;

        let id = session_conversation_id(&session.booking_id);
        if let Some(existing) = self.conversations.find_by_id(&id).await? {
            return Ok(existing);
        }

        let conversation = Conversation::for_session(
            &session.booking_id,
            &session.learner_id,
            &session.volunteer_id,
            self.clock.now(),
        )?;
        self.conversations.save(&conversation).await?;
        tracing::debug!(conversation_id = %conversation.id, "In-call thread created");
        Ok(conversation)
    }

    pub async fn get_conversation(&self, conversation_id: &str) -> Result<Conversation> {
        self.conversations
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| MentorError::not_found("conversation", conversation_id))
    }

    /// Appends a message and updates the thread summary in one write.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the conversation does not exist
    /// - `Validation` if `text` is blank or the sender is not a participant
    pub async fn append_message(
        &self,
        conversation_id: &str,
        sender_id: &str,
        text: &str,
    ) -> Result<Message> {
        let _guard = self.lock.lock().await;

        let mut conversation = self.get_conversation(conversation_id).await?;
        if !conversation.has_participant(sender_id) {
            return Err(MentorError::validation(format!(
                "{} is not part of conversation {}",
                sender_id, conversation_id
            )));
        }

        let message = Message::new(conversation_id, sender_id, text, self.clock.now())?;
        conversation.record_message(&message);
        self.conversations.append_message(&conversation, &message).await?;

        tracing::debug!(conversation_id, sender_id, "Message appended");
        Ok(message)
    }

    /// Appends a message and, when enabled, schedules the other
    /// participant's auto-reply.
    pub async fn send_message(
        &self,
        conversation_id: &str,
        sender_id: &str,
        text: &str,
    ) -> Result<SentMessage> {
        let message = self.append_message(conversation_id, sender_id, text).await?;

        let auto_reply = if self.auto_reply.enabled {
            let conversation = self.get_conversation(conversation_id).await?;
            conversation
                .other_participant(sender_id)
                .map(|responder| self.schedule_auto_reply(conversation_id, responder))
        } else {
            None
        };

        Ok(SentMessage {
            message,
            auto_reply,
        })
    }

    /// Spawns a task that appends the configured reply after a random
    /// delay. Nothing awaits it; its ordering relative to messages the
    /// user sends meanwhile is not guaranteed.
    pub fn schedule_auto_reply(&self, conversation_id: &str, responder_id: &str) -> JoinHandle<()> {
        let delay = self.reply_delay();
        let service = self.clone();
        let conversation_id = conversation_id.to_string();
        let responder_id = responder_id.to_string();

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let text = service.auto_reply.text.clone();
            match service
                .append_message(&conversation_id, &responder_id, &text)
                .await
            {
                Ok(_) => tracing::debug!(%conversation_id, %responder_id, "Auto-reply delivered"),
                Err(e) => tracing::warn!(%conversation_id, "Auto-reply failed: {}", e),
            }
        })
    }

    pub async fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        self.get_conversation(conversation_id).await?;
        self.conversations.list_messages(conversation_id).await
    }

    /// A user's threads, most recent message first.
    pub async fn list_conversations(&self, user_id: &str) -> Result<Vec<Conversation>> {
        self.conversations.list_for_user(user_id).await
    }

    /// Clears `reader_id`'s unread counter.
    pub async fn mark_read(&self, conversation_id: &str, reader_id: &str) -> Result<Conversation> {
        let _guard = self.lock.lock().await;

        let mut conversation = self.get_conversation(conversation_id).await?;
        if !conversation.has_participant(reader_id) {
            return Err(MentorError::validation(format!(
                "{} is not part of conversation {}",
                reader_id, conversation_id
            )));
        }
        conversation.mark_read(reader_id, self.clock.now());
        self.conversations.save(&conversation).await?;
        Ok(conversation)
    }

    fn reply_delay(&self) -> Duration {
        let (min, max) = (self.auto_reply.min_delay_ms, self.auto_reply.max_delay_ms);
        let millis = if min >= max {
            min
        } else {
            rand::thread_rng().gen_range(min..=max)
        };
        Duration::from_millis(millis)
    }
}
