use super::CliContext;
use anyhow::{Context, Result};
use mentorlink_core::conversation::Message;

pub async fn open(ctx: &CliContext, with: &str) -> Result<()> {
    let other = ctx.services.profiles.get_user(with).await?;
    let conversation = ctx
        .services
        .conversations
        .get_or_create_conversation(&ctx.user, &other.id)
        .await?;

    ctx.emit(&conversation, |c| {
        println!("Conversation with {}: {}", other.full_name, c.id)
    })
}

/// Sends a message and waits for the simulated reply, if one is scheduled.
pub async fn send(ctx: &CliContext, conversation_id: &str, text: &str) -> Result<()> {
    let conversations = &ctx.services.conversations;
    let sent = conversations.send_message(conversation_id, &ctx.user, text).await?;
    let mut delivered = vec![sent.message];

    if let Some(reply) = sent.auto_reply {
        reply.await.context("Auto-reply task failed")?;
        let messages = conversations.list_messages(conversation_id).await?;
        if let Some(last) = messages.into_iter().last().filter(|m| m.sender_id != ctx.user) {
            delivered.push(last);
        }
    }

    let names = names_for(ctx, &delivered).await;
    ctx.emit(&delivered, |messages| {
        for m in messages {
            print_message(m, &names);
        }
    })
}

pub async fn show(ctx: &CliContext, conversation_id: &str) -> Result<()> {
    let conversations = &ctx.services.conversations;
    // mark_read rejects non-participants.
    conversations.mark_read(conversation_id, &ctx.user).await?;
    let messages = conversations.list_messages(conversation_id).await?;

    let names = names_for(ctx, &messages).await;
    ctx.emit(&messages, |messages| {
        if messages.is_empty() {
            println!("No messages yet.");
        }
        for m in messages {
            print_message(m, &names);
        }
    })
}

pub async fn list(ctx: &CliContext) -> Result<()> {
    let threads = ctx.services.conversations.list_conversations(&ctx.user).await?;

    let mut lines = Vec::with_capacity(threads.len());
    for c in &threads {
        let other = match c.other_participant(&ctx.user) {
            Some(id) => ctx.display_name(id).await,
            None => "-".to_string(),
        };
        lines.push(other);
    }

    ctx.emit(&threads, |threads| {
        if threads.is_empty() {
            println!("No conversations.");
        }
        for (c, other) in threads.iter().zip(&lines) {
            let unread = c.unread_for(&ctx.user);
            let badge = if unread > 0 { format!(" ({unread} new)") } else { String::new() };
            println!("{}  {}{}", c.id, other, badge);
            if let Some(last) = &c.last_message {
                println!("    {last}");
            }
        }
    })
}

pub(super) async fn names_for(ctx: &CliContext, messages: &[Message]) -> Vec<(String, String)> {
    let mut names: Vec<(String, String)> = Vec::new();
    for m in messages {
        if !names.iter().any(|(id, _)| id == &m.sender_id) {
            names.push((m.sender_id.clone(), ctx.display_name(&m.sender_id).await));
        }
    }
    names
}

pub(super) fn print_message(message: &Message, names: &[(String, String)]) {
    let name = names
        .iter()
        .find(|(id, _)| id == &message.sender_id)
        .map_or(message.sender_id.as_str(), |(_, name)| name.as_str());
    println!("[{}] {}: {}", message.timestamp.format("%H:%M"), name, message.text);
}
