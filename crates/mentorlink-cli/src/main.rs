use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use mentorlink_application::AppServices;
use mentorlink_core::clock::{Clock, ManualClock, SystemClock};
use mentorlink_core::config::AppConfig;
use mentorlink_infrastructure::seed::{DEMO_LEARNER_ID, seed_demo};
use mentorlink_infrastructure::{ConfigService, MentorPaths};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::CliContext;

#[derive(Parser)]
#[command(name = "mentorlink")]
#[command(about = "MentorLink - book, hold and rate coaching calls with volunteers", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory, overriding the configured one
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Keep everything in memory, starting from the demo data
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Acting user
    #[arg(long, global = true, default_value = DEMO_LEARNER_ID)]
    user: String,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert the demo volunteers and learner
    Seed,
    /// List volunteers, optionally filtered by name, specialty or skill
    Volunteers { query: Option<String> },
    /// Register a new user
    Register(commands::profile::RegisterArgs),
    /// Show or edit the acting user's profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Book a call with a volunteer
    Book {
        volunteer_id: String,
        /// YYYY-MM-DD
        date: String,
        /// HH:MM
        time: String,
        #[arg(long)]
        topic: Option<String>,
        /// What you would like help with
        #[arg(long)]
        description: Option<String>,
    },
    /// List the acting user's active bookings
    Bookings,
    /// Cancel a scheduled booking
    Cancel { booking_id: String },
    /// Join a call, chat during it and end it with an empty line
    Join { booking_id: String },
    /// End a call left running by an interrupted `join`
    End { booking_id: String },
    /// Join a call and end it after a simulated duration
    Session {
        booking_id: String,
        #[arg(long, default_value_t = 30)]
        minutes: u32,
    },
    /// Save notes for a call that is running or awaiting a rating
    Notes { booking_id: String, text: String },
    /// Show the chat messages sent during a call
    Transcript { booking_id: String },
    /// Rate a completed call from 1 to 5
    Rate {
        booking_id: String,
        score: u8,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Archive a completed call without rating it
    Skip { booking_id: String },
    /// Show past calls and statistics
    History,
    /// Message other users
    Chat {
        #[command(subcommand)]
        action: ChatAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    Show,
    Update(commands::profile::UpdateArgs),
}

#[derive(Subcommand)]
enum ChatAction {
    /// Open (or reuse) the conversation with another user
    Open { with: String },
    Send { conversation_id: String, text: String },
    /// Print a conversation and mark it read
    Show { conversation_id: String },
    List,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.clone())?;
    init_tracing(cli.verbose, &config.log_level);

    // `session` fast-forwards this clock instead of waiting.
    let simulated = ManualClock::new(Utc::now());
    let clock: Arc<dyn Clock> = match cli.command {
        Commands::Session { .. } => Arc::new(simulated.clone()),
        _ => Arc::new(SystemClock),
    };

    let services = if cli.ephemeral {
        let services = AppServices::in_memory(&config, clock)?;
        seed_demo(services.repositories.users.as_ref(), services.clock.now()).await?;
        services
    } else {
        if let Some(dir) = cli.data_dir {
            config.storage.data_dir = Some(dir);
        }
        AppServices::file_backed(&MentorPaths::new(None), &config, clock)
            .context("Failed to open the data directory")?
    };

    let ctx = CliContext {
        services,
        user: cli.user,
        json: cli.json,
    };
    tracing::debug!(user = %ctx.user, ephemeral = cli.ephemeral, "Services ready");

    match cli.command {
        Commands::Seed => commands::directory::seed(&ctx).await,
        Commands::Volunteers { query } => commands::directory::volunteers(&ctx, query.as_deref()).await,
        Commands::Register(args) => commands::profile::register(&ctx, args).await,
        Commands::Profile { action } => match action {
            ProfileAction::Show => commands::profile::show(&ctx).await,
            ProfileAction::Update(args) => commands::profile::update(&ctx, args).await,
        },
        Commands::Book {
            volunteer_id,
            date,
            time,
            topic,
            description,
        } => commands::booking::book(&ctx, &volunteer_id, &date, &time, topic, description).await,
        Commands::Bookings => commands::booking::list(&ctx).await,
        Commands::Cancel { booking_id } => commands::booking::cancel(&ctx, &booking_id).await,
        Commands::Join { booking_id } => commands::booking::join(&ctx, &booking_id).await,
        Commands::End { booking_id } => commands::booking::end(&ctx, &booking_id).await,
        Commands::Session { booking_id, minutes } => {
            commands::booking::simulate(&ctx, &booking_id, minutes, &simulated).await
        }
        Commands::Notes { booking_id, text } => commands::booking::notes(&ctx, &booking_id, &text).await,
        Commands::Transcript { booking_id } => commands::booking::transcript(&ctx, &booking_id).await,
        Commands::Rate {
            booking_id,
            score,
            comment,
        } => commands::rating::rate(&ctx, &booking_id, score, comment).await,
        Commands::Skip { booking_id } => commands::rating::skip(&ctx, &booking_id).await,
        Commands::History => commands::rating::history(&ctx).await,
        Commands::Chat { action } => match action {
            ChatAction::Open { with } => commands::chat::open(&ctx, &with).await,
            ChatAction::Send {
                conversation_id,
                text,
            } => commands::chat::send(&ctx, &conversation_id, &text).await,
            ChatAction::Show { conversation_id } => commands::chat::show(&ctx, &conversation_id).await,
            ChatAction::List => commands::chat::list(&ctx).await,
        },
    }
}

fn load_config(path: Option<PathBuf>) -> Result<AppConfig> {
    let service = match path {
        Some(path) => ConfigService::with_file(path),
        None => ConfigService::new(&MentorPaths::new(None)).context("Failed to locate the config directory")?,
    };
    service
        .get_config()
        .with_context(|| format!("Failed to load config from {}", service.path().display()))
}

/// `RUST_LOG` wins, then `--verbose`, then the configured level.
fn init_tracing(verbose: bool, configured: &str) {
    let fallback = if verbose { "debug" } else { configured };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
