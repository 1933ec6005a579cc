use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod commands;

use commands::context::AppContext;

/// Environment variable holding the tracing filter directive.
const LOG_ENV: &str = "GEOPORT_LOG";

#[derive(Parser)]
#[command(name = "geoport")]
#[command(about = "GeoPort - device location override coordinator", long_about = None)]
struct Cli {
    /// Device identifier to act on
    #[arg(long, global = true, default_value = "")]
    device: String,

    /// Authorization value, e.g. "Bearer <token>"
    #[arg(long, global = true, default_value = "")]
    token: String,

    /// Config file (defaults to ~/.config/geoport/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Skip the simulated mechanism latencies
    #[arg(long, global = true)]
    no_delay: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Override the device location
    #[command(allow_negative_numbers = true)]
    Set {
        latitude: f64,
        longitude: f64,
        /// Origin label recorded in history
        #[arg(long)]
        source: Option<String>,
        /// Keep the override for this many seconds (or until Ctrl-C), then stop it
        #[arg(long)]
        hold: Option<u64>,
    },
    /// Re-apply a coordinate from history
    Reapply {
        entry_id: Uuid,
        #[arg(long)]
        source: Option<String>,
    },
    /// Show override history, newest first
    History {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Remove one history entry
    Forget { entry_id: Uuid },
    /// Remove all history for the device
    Clear,
    /// Show coordinator health
    Health,
    /// Interactive session: set/stop/status against one long-lived coordinator
    Shell,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let ctx = AppContext::init(cli.config.as_deref(), cli.no_delay, &cli.device, &cli.token).await?;

    match cli.command {
        Commands::Set {
            latitude,
            longitude,
            source,
            hold,
        } => commands::actions::set(&ctx, latitude, longitude, source.as_deref(), hold).await?,
        Commands::Reapply { entry_id, source } => {
            commands::actions::reapply(&ctx, entry_id, source.as_deref()).await?
        }
        Commands::History { limit } => commands::actions::history(&ctx, limit).await?,
        Commands::Forget { entry_id } => commands::actions::forget(&ctx, entry_id).await?,
        Commands::Clear => commands::actions::clear(&ctx).await?,
        Commands::Health => commands::actions::health(&ctx).await?,
        Commands::Shell => commands::shell::run(&ctx).await?,
    }

    Ok(())
}
