use super::{CliContext, chat};
use anyhow::{Context, Result};
use chrono::Duration;
use mentorlink_core::MentorError;
use mentorlink_core::booking::{Booking, NewBooking};
use mentorlink_core::clock::ManualClock;
use mentorlink_core::session::{CompletedSession, SessionHandle, format_duration};
use mentorlink_core::slot::TimeSlot;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn book(
    ctx: &CliContext,
    volunteer_id: &str,
    date: &str,
    time: &str,
    topic: Option<String>,
    description: Option<String>,
) -> Result<()> {
    let slot = TimeSlot::parse(date, time).ok_or_else(|| {
        MentorError::validation(format!(
            "Invalid date or time '{date} {time}': expected YYYY-MM-DD HH:MM"
        ))
    })?;
    let mut request = NewBooking::new(&ctx.user, volunteer_id, slot);
    if let Some(topic) = topic {
        request = request.with_topic(topic);
    }
    if let Some(description) = description {
        request = request.with_description(description);
    }

    let booking = ctx.services.bookings.create_booking(request).await?;
    ctx.emit(&booking, |b| {
        println!("Booked {} with {} on {}.", b.topic, b.volunteer_name, b.slot());
        println!("Booking id: {}", b.id);
    })
}

pub async fn list(ctx: &CliContext) -> Result<()> {
    let bookings = ctx.services.bookings.list_bookings(&ctx.user).await?;
    ctx.emit(&bookings, |bookings| {
        if bookings.is_empty() {
            println!("No active bookings.");
        }
        for b in bookings {
            print_booking(b);
        }
    })
}

pub async fn cancel(ctx: &CliContext, booking_id: &str) -> Result<()> {
    let booking = ctx.services.bookings.cancel_booking(booking_id).await?;
    ctx.emit(&booking, |b| {
        println!("Cancelled the call with {} on {}.", b.volunteer_name, b.slot())
    })
}

/// Runs a call until the user enters an empty line or presses Ctrl-C,
/// printing the elapsed time. Any other line goes to the in-call chat.
pub async fn join(ctx: &CliContext, booking_id: &str) -> Result<()> {
    let sessions = &ctx.services.sessions;
    let handle = sessions.join_session(booking_id).await?;
    if !ctx.json {
        announce(ctx, &handle).await;
        println!("Type to chat. An empty line or Ctrl-C ends the call.");
    }

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(1));
    let mut shown = 0;
    loop {
        tokio::select! {
            line = stdin.next_line() => {
                match line.context("Failed to read from stdin")? {
                    Some(text) if !text.trim().is_empty() => {
                        sessions.send_in_call(&handle, &text).await?;
                    }
                    _ => break,
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                break;
            }
            _ = ticker.tick() => {
                if !ctx.json {
                    shown = print_new_messages(ctx, &handle.booking_id, shown).await?;
                    let tally = sessions.duration_tally(&handle).await?;
                    print!("\r  {}", format_duration(tally));
                    std::io::stdout().flush().context("Failed to write to stdout")?;
                }
            }
        }
    }

    let completed = sessions.end_session(&handle).await?;
    finish(ctx, &completed)
}

/// Ends a call whose `join` exited without ending it.
pub async fn end(ctx: &CliContext, booking_id: &str) -> Result<()> {
    let sessions = &ctx.services.sessions;
    let handle = sessions.resume_session(booking_id).await?;
    let completed = sessions.end_session(&handle).await?;
    finish(ctx, &completed)
}

pub async fn notes(ctx: &CliContext, booking_id: &str, text: &str) -> Result<()> {
    let booking = ctx.services.sessions.record_notes(booking_id, text).await?;
    ctx.emit(&booking, |b| match &b.notes {
        Some(_) => println!("Saved notes for the call with {}.", b.volunteer_name),
        None => println!("Cleared the notes for the call with {}.", b.volunteer_name),
    })
}

/// Prints the in-call chat of a booking.
pub async fn transcript(ctx: &CliContext, booking_id: &str) -> Result<()> {
    let messages = ctx.services.sessions.in_call_messages(booking_id).await?;
    let names = chat::names_for(ctx, &messages).await;
    ctx.emit(&messages, |messages| {
        if messages.is_empty() {
            println!("No messages during this call.");
        }
        for m in messages {
            chat::print_message(m, &names);
        }
    })
}

/// Joins and ends a call, fast-forwarding `clock` by `minutes` in between.
pub async fn simulate(ctx: &CliContext, booking_id: &str, minutes: u32, clock: &ManualClock) -> Result<()> {
    let sessions = &ctx.services.sessions;
    let handle = sessions.join_session(booking_id).await?;
    if !ctx.json {
        announce(ctx, &handle).await;
    }

    clock.advance(Duration::minutes(i64::from(minutes)));

    let completed = sessions.end_session(&handle).await?;
    finish(ctx, &completed)
}

async fn announce(ctx: &CliContext, handle: &SessionHandle) {
    match ctx.services.sessions.live_session(&handle.learner_id).await {
        Some(live) => println!("In call with {} about {}.", live.volunteer_name, live.topic),
        None => println!("In call for booking {}.", handle.booking_id),
    }
}

/// Prints in-call messages past the first `shown` and returns the new count.
async fn print_new_messages(ctx: &CliContext, booking_id: &str, shown: usize) -> Result<usize> {
    let messages = ctx.services.sessions.in_call_messages(booking_id).await?;
    if let Some(new) = messages.get(shown..).filter(|new| !new.is_empty()) {
        let names = chat::names_for(ctx, new).await;
        println!();
        for m in new {
            chat::print_message(m, &names);
        }
    }
    Ok(messages.len())
}

fn finish(ctx: &CliContext, completed: &CompletedSession) -> Result<()> {
    ctx.emit(completed, |c| {
        println!();
        println!(
            "Call with {} ended after {}.",
            c.volunteer_name,
            format_duration(c.duration())
        );
        println!(
            "Rate it with `mentorlink rate {} <1-5>` or `mentorlink skip {}`.",
            c.booking_id, c.booking_id
        );
    })
}

fn print_booking(b: &Booking) {
    println!("{}  {}  {}", b.slot(), b.status, b.id);
    println!("    {} with {}", b.topic, b.volunteer_name);
    if let Some(description) = &b.description {
        println!("    {description}");
    }
    if let Some(notes) = &b.notes {
        println!("    Notes: {notes}");
    }
}
