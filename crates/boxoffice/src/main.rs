//! boxoffice - command-line front-end for the event ticketing platform.
//!
//! Main entry point for the boxoffice CLI.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};

use boxoffice_client::{Endpoints, ServiceClientSet};
use boxoffice_session::{AuthGateway, FileStorage};

mod commands;

use commands::{auth, events, profile, theme, tickets};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// boxoffice - browse events and manage tickets
#[derive(Parser)]
#[command(name = "boxoffice")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Directory holding the persisted session and logs
    #[arg(long, global = true, env = "BOXOFFICE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Identity service URL
    #[arg(long, global = true)]
    pub identity_url: Option<String>,

    /// Catalog service URL
    #[arg(long, global = true)]
    pub catalog_url: Option<String>,

    /// Ticketing service URL
    #[arg(long, global = true)]
    pub ticketing_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in
    Login(auth::LoginArgs),

    /// Create an account and sign in
    Register(auth::RegisterArgs),

    /// Sign out and forget the stored credential
    Logout,

    /// Show who is signed in
    Whoami,

    /// Browse events
    Events(events::EventsArgs),

    /// Buy and manage tickets
    Tickets(tickets::TicketsArgs),

    /// Account profile
    Profile(profile::ProfileArgs),

    /// Display theme preference
    Theme(theme::ThemeArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = boxoffice_config::load_config(None)
        .context("failed to load configuration")?;
    if let Some(dir) = cli.data_dir.clone() {
        config.config.data_dir = Some(dir);
    }
    let overrides = [
        (&cli.identity_url, &mut config.config.endpoints.identity),
        (&cli.catalog_url, &mut config.config.endpoints.catalog),
        (&cli.ticketing_url, &mut config.config.endpoints.ticketing),
    ];
    for (flag, slot) in overrides {
        if let Some(url) = flag {
            *slot = Some(url.clone());
        }
    }
    let data_dir = config.config.data_dir();

    // Console output for humans, daily-rotated JSON file for later inspection
    let filter = if cli.verbose {
        "boxoffice=debug,boxoffice_session=debug,boxoffice_client=debug,boxoffice_config=debug,warn"
    } else {
        "boxoffice=info,boxoffice_session=warn,boxoffice_client=warn,warn"
    };

    let file_appender = tracing_appender::rolling::daily(data_dir.join("logs"), "boxoffice.log");
    let (non_blocking, log_guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "boxoffice=trace,boxoffice_session=trace,boxoffice_client=trace,boxoffice_config=trace,info",
                )),
        )
        .init();

    for warning in &config.warnings {
        tracing::warn!("{}", warning);
    }

    let cfg = &config.config;
    let mut builder = ServiceClientSet::builder()
        .endpoints(Endpoints::new(
            cfg.identity_url(),
            cfg.catalog_url(),
            cfg.ticketing_url(),
        ))
        .timeout(cfg.timeout());
    if let Some(agent) = &cfg.client.user_agent {
        builder = builder.user_agent(agent);
    }
    let clients = builder.build().context("failed to build service clients")?;

    let storage = Arc::new(FileStorage::new(&data_dir));
    let gateway = AuthGateway::new(clients, storage.clone());
    gateway.initialize().await;

    let ctx = commands::Context {
        gateway,
        storage,
        json_output: cli.json,
        verbose: cli.verbose,
    };

    // Dispatch to command handlers
    let result = match cli.command {
        Commands::Login(args) => auth::login(args, &ctx).await,
        Commands::Register(args) => auth::register(args, &ctx).await,
        Commands::Logout => auth::logout(&ctx).await,
        Commands::Whoami => auth::whoami(&ctx).await,
        Commands::Events(args) => events::run(args, &ctx).await,
        Commands::Tickets(args) => tickets::run(args, &ctx).await,
        Commands::Profile(args) => profile::run(args, &ctx).await,
        Commands::Theme(args) => theme::run(args, &ctx).await,
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "Command failed");
        commands::print_error(format!("{:#}", e));
        if let Some(hint) = commands::hint(&e) {
            commands::print_hint(hint);
        }
        drop(log_guard);
        std::process::exit(1);
    }
    Ok(())
}
