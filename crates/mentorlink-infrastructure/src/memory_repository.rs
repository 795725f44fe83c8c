//! In-memory repository implementations.
//!
//! Used by tests and by the CLI's `--ephemeral` mode. They follow the same
//! contracts as the TOML repositories, including `AlreadyResolved` on a
//! second rating or history record for the same booking.

use crate::toml_conversation_repository::ConversationThread;
use async_trait::async_trait;
use mentorlink_core::booking::{Booking, BookingRepository};
use mentorlink_core::conversation::{
    Conversation, ConversationRepository, Message, participant_key,
};
use mentorlink_core::error::{MentorError, Result};
use mentorlink_core::rating::{HistoryRecord, HistoryRepository, Rating, RatingRepository};
use mentorlink_core::user::{User, UserRepository};
use std::cmp::Reverse;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn save(&self, user: &User) -> Result<()> {
        self.users
            .write()
            .await
            .insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(users)
    }
}

#[derive(Default)]
pub struct InMemoryBookingRepository {
    bookings: RwLock<HashMap<String, Booking>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn find_by_id(&self, booking_id: &str) -> Result<Option<Booking>> {
        Ok(self.bookings.read().await.get(booking_id).cloned())
    }

    async fn save(&self, booking: &Booking) -> Result<()> {
        self.bookings
            .write()
            .await
            .insert(booking.id.clone(), booking.clone());
        Ok(())
    }

    async fn delete(&self, booking_id: &str) -> Result<()> {
        self.bookings.write().await.remove(booking_id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self.bookings.read().await.values().cloned().collect();
        bookings.sort_by_key(|b| (b.slot(), b.created_at));
        Ok(bookings)
    }
}

#[derive(Default)]
pub struct InMemoryRatingRepository {
    ratings: RwLock<Vec<Rating>>,
}

impl InMemoryRatingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RatingRepository for InMemoryRatingRepository {
    async fn find_by_booking(&self, booking_id: &str) -> Result<Option<Rating>> {
        Ok(self
            .ratings
            .read()
            .await
            .iter()
            .find(|r| r.booking_id == booking_id)
            .cloned())
    }

    async fn insert(&self, rating: &Rating) -> Result<()> {
        let mut ratings = self.ratings.write().await;
        if ratings.iter().any(|r| r.booking_id == rating.booking_id) {
            return Err(MentorError::already_resolved(&rating.booking_id));
        }
        ratings.push(rating.clone());
        Ok(())
    }

    async fn list_by_rated_user(&self, user_id: &str) -> Result<Vec<Rating>> {
        Ok(self
            .ratings
            .read()
            .await
            .iter()
            .filter(|r| r.rated_user_id == user_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryHistoryRepository {
    records: RwLock<Vec<HistoryRecord>>,
}

impl InMemoryHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryRepository for InMemoryHistoryRepository {
    async fn find_by_booking(&self, booking_id: &str) -> Result<Option<HistoryRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|r| r.booking_id == booking_id)
            .cloned())
    }

    async fn append(&self, record: &HistoryRecord) -> Result<()> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.booking_id == record.booking_id) {
            return Err(MentorError::already_resolved(&record.booking_id));
        }
        records.push(record.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<HistoryRecord>> {
        let mut records = self.records.read().await.clone();
        // Equal timestamps: latest append first.
        records.reverse();
        records.sort_by(|a, b| b.archived_at.cmp(&a.archived_at));
        Ok(records)
    }
}

#[derive(Default)]
pub struct InMemoryConversationRepository {
    threads: RwLock<HashMap<String, ConversationThread>>,
}

impl InMemoryConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn find_by_id(&self, conversation_id: &str) -> Result<Option<Conversation>> {
        Ok(self
            .threads
            .read()
            .await
            .get(conversation_id)
            .map(|thread| thread.conversation.clone()))
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
            .await
            .values()
            .find(|thread| {
                thread.conversation.participants == key && !thread.conversation.is_session_thread()
            })
            .map(|thread| thread.conversation.clone()))
    }

    async fn save(&self, conversation: &Conversation) -> Result<()> {
        let mut threads = self.threads.write().await;
        threads
            .entry(conversation.id.clone())
            .and_modify(|thread| thread.conversation = conversation.clone())
            .or_insert_with(|| ConversationThread {
                conversation: conversation.clone(),
                messages: Vec::new(),
            });
        Ok(())
    }

    async fn append_message(&self, conversation: &Conversation, message: &Message) -> Result<()> {
        if message.conversation_id != conversation.id {
            return Err(MentorError::validation(format!(
                "Message belongs to conversation {}, not {}",
                message.conversation_id, conversation.id
            )));
        }
        let mut threads = self.threads.write().await;
        let thread = threads
            .get_mut(&conversation.id)
            .ok_or_else(|| MentorError::not_found("conversation", &conversation.id))?;
        thread.messages.push(message.clone());
        thread.conversation = conversation.clone();
        Ok(())
    }

    async fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let mut messages = self
            .threads
            .read()
            .await
            .get(conversation_id)
            .map(|thread| thread.messages.clone())
            .unwrap_or_default();
        messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(messages)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Conversation>> {
        let mut conversations: Vec<Conversation> = self
            .threads
            .read()
            .await
            .values()
            .filter(|thread| {
                thread.conversation.has_participant(user_id) && !thread.conversation.is_session_thread()
            })
            .map(|thread| thread.conversation.clone())
            .collect();
        conversations.sort_by_key(|c| Reverse(c.last_activity()));
        Ok(conversations)
    }
}
