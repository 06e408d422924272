//! CLI administration tool for l1nkzip.
//!
//! Inspects and withdraws links and translates between ids and short codes
//! without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Show a link
//! cargo run --bin admin -- link info 5wppq
//!
//! # Disable a link (also evicts it from the redirect cache)
//! cargo run --bin admin -- link disable 5wppq
//!
//! # Translate between row ids and codes
//! cargo run --bin admin -- codec encode 23
//! cargo run --bin admin -- codec decode 5wppq
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server; see `l1nkzip::config`.
//!
//! `link disable` needs to reach the server's redirect cache. It refuses to
//! run while the server would be using its process-local cache: set
//! `REDIS_URL`, or run the server with `CACHE_ENABLED=false`.

use l1nkzip::application::services::{LinkService, RedirectService, RedirectSettings};
use l1nkzip::config::{self, Config};
use l1nkzip::domain::repositories::LinkRepository;
use l1nkzip::infrastructure::phishing::NullGate;
use l1nkzip::infrastructure::telemetry::MetricsEventSink;
use l1nkzip::infrastructure::cache::{self, CacheService, NullCache};
use l1nkzip::infrastructure::persistence;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::sync::Arc;
use tokio::sync::mpsc;

/// CLI tool for managing l1nkzip.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Inspect or withdraw links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Translate between row ids and short codes
    Codec {
        #[command(subcommand)]
        action: CodecAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum LinkAction {
    /// Show a link by short code
    Info { code: String },

    /// Disable a link so it no longer resolves
    Disable {
        code: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum CodecAction {
    /// Print the short code of a row id
    Encode { id: i64 },

    /// Print the row id behind a short code
    Decode { code: String },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;

    match cli.command {
        Commands::Codec { action } => handle_codec_action(action, &config)?,
        Commands::Link { action } => handle_link_action(action, &config).await?,
        Commands::Db { action } => handle_db_action(action, &config).await?,
    }

    Ok(())
}

/// Builds the same service stack as the server, minus the phishing gate.
async fn build_service(
    config: &Config,
    cache: Arc<dyn CacheService>,
) -> Result<(
    RedirectService<dyn LinkRepository>,
    mpsc::Receiver<l1nkzip::domain::visit_event::VisitEvent>,
)> {
    let repository = persistence::connect(config)
        .await
        .context("Failed to open database")?;
    let links = Arc::new(LinkService::new(repository, Arc::new(config.codec()?)));
    let (visit_tx, visit_rx) = mpsc::channel(1);

    let service = RedirectService::new(
        links,
        cache,
        Arc::new(NullGate),
        Arc::new(MetricsEventSink),
        visit_tx,
        RedirectSettings {
            api_domain: config.api_domain.clone(),
            cache_ttl_seconds: config.cache_ttl_seconds,
        },
    );

    Ok((service, visit_rx))
}

async fn handle_link_action(action: LinkAction, config: &Config) -> Result<()> {
    match action {
        LinkAction::Info { code } => {
            let (service, _visits) = build_service(config, Arc::new(NullCache::new())).await?;

            let short = service
                .get_link_info(&code)
                .await
                .map_err(|e| anyhow::anyhow!("{}: {}", code, e))?;

            println!("{}", "🔗 Link".bright_blue().bold());
            println!();
            println!("  Code:    {}", short.link.code.cyan());
            println!("  ID:      {}", short.link.id.to_string().bright_black());
            println!("  Short:   {}", short.full_link.bright_white());
            println!("  Target:  {}", short.link.url);
            println!(
                "  Visits:  {}",
                short.link.visits.to_string().bright_green().bold()
            );
            println!(
                "  Created: {}",
                short
                    .link
                    .created_at
                    .format("%Y-%m-%d %H:%M")
                    .to_string()
                    .bright_black()
            );
            println!();
        }
        LinkAction::Disable { code, yes } => {
            let cache = cache::shared_from_config(config)
                .await
                .context("Cannot evict the link from the server's redirect cache")?;
            let (service, _visits) = build_service(config, cache).await?;

            let short = service
                .get_link_info(&code)
                .await
                .map_err(|e| anyhow::anyhow!("{}: {}", code, e))?;

            println!("  Code:   {}", short.link.code.cyan());
            println!("  Target: {}", short.link.url);
            println!();

            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt("Disable this link?")
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("{}", "❌ Cancelled".red());
                    return Ok(());
                }
            }

            service
                .disable_link(&code)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to disable link: {}", e))?;

            println!("{}", "✅ Link disabled".green().bold());
        }
    }

    Ok(())
}

fn handle_codec_action(action: CodecAction, config: &Config) -> Result<()> {
    let codec = config.codec()?;

    match action {
        CodecAction::Encode { id } => println!("{}", codec.encode(id)?.cyan()),
        CodecAction::Decode { code } => println!("{}", codec.decode(&code)?),
    }

    Ok(())
}

async fn handle_db_action(action: DbAction, config: &Config) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            let repository = persistence::connect(config)
                .await
                .context("Failed to open database")?;
            repository
                .check_connection()
                .await
                .map_err(|e| anyhow::anyhow!("Database check failed: {}", e))?;

            println!(
                "{} ({})",
                "✅ Database connection OK".green().bold(),
                config::mask_connection_string(&config.database_url).bright_black()
            );
        }
    }

    Ok(())
}
