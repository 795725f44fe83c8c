use super::CliContext;
use anyhow::Result;
use mentorlink_core::catalog::CatalogProvider;
use mentorlink_infrastructure::seed::seed_demo;

pub async fn seed(ctx: &CliContext) -> Result<()> {
    let services = &ctx.services;
    let inserted = seed_demo(services.repositories.users.as_ref(), services.clock.now()).await?;
    ctx.emit(&inserted, |n| {
        if *n == 0 {
            println!("Demo data already present.");
        } else {
            println!("Inserted {n} demo users.");
        }
    })
}

pub async fn volunteers(ctx: &CliContext, query: Option<&str>) -> Result<()> {
    let listings = ctx.services.catalog.search_volunteers(query.unwrap_or("")).await?;

    ctx.emit(&listings, |listings| {
        if listings.is_empty() {
            println!("No volunteers found.");
            return;
        }
        for v in listings {
            let rating = v
                .rating
                .map(|r| format!("{r:.1}/5"))
                .unwrap_or_else(|| "not rated".to_string());
            println!("{}  {}", v.id, v.name);
            println!(
                "    {} | {} | {} ({} sessions)",
                v.specialty.as_deref().unwrap_or("-"),
                v.location.as_deref().unwrap_or("-"),
                rating,
                v.sessions
            );
            if !v.skills.is_empty() {
                println!("    skills: {}", v.skills.join(", "));
            }
            if let Some(next) = v.offered_slots.first() {
                println!("    {} slots, first {}", v.offered_slots.len(), next);
            }
        }
    })
}
