use super::{CliContext, stars};
use anyhow::Result;
use mentorlink_core::rating::{HistoryRecord, HistoryStats};
use mentorlink_core::session::format_duration;
use serde::Serialize;

#[derive(Serialize)]
struct HistoryView {
    stats: HistoryStats,
    records: Vec<HistoryRecord>,
}

pub async fn rate(ctx: &CliContext, booking_id: &str, score: u8, comment: Option<String>) -> Result<()> {
    let ratings = &ctx.services.ratings;
    let completed = ratings.completed_session(booking_id).await?;
    let rating = ratings.submit_rating(&completed, score, comment).await?;

    ctx.emit(&rating, |r| {
        println!("Rated {} {}. Thank you!", completed.volunteer_name, stars(r.score))
    })
}

pub async fn skip(ctx: &CliContext, booking_id: &str) -> Result<()> {
    let ratings = &ctx.services.ratings;
    let completed = ratings.completed_session(booking_id).await?;
    let record = ratings.skip_rating(&completed).await?;

    ctx.emit(&record, |r| {
        println!("Saved the call with {} to your history.", r.volunteer_name)
    })
}

pub async fn history(ctx: &CliContext) -> Result<()> {
    let ratings = &ctx.services.ratings;
    let view = HistoryView {
        stats: ratings.history_stats(&ctx.user).await?,
        records: ratings.history(&ctx.user).await?,
    };

    ctx.emit(&view, |view| {
        let stats = &view.stats;
        let average = stats
            .average_rating
            .map(|a| format!("{a:.1}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} sessions, {} rated, average {}",
            stats.total_sessions, stats.rated_sessions, average
        );
        for r in &view.records {
            let rating = r.rating.map(stars).unwrap_or_else(|| "not rated".to_string());
            println!(
                "{} {}  {} with {}  {}  {}",
                r.date.format("%Y-%m-%d"),
                r.time.format("%H:%M"),
                r.topic,
                r.volunteer_name,
                format_duration(chrono::Duration::seconds(r.duration_secs)),
                rating
            );
            if let Some(comment) = &r.comment {
                println!("    \"{comment}\"");
            }
            if let Some(notes) = &r.notes {
                println!("    Notes: {notes}");
            }
        }
    })
}
