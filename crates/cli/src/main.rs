use anyhow::Result;
use clap::{Parser, Subcommand};
use seadex_rss_core::{AppConfig, TrackedId};
use seadex_rss_core::constants::DEFAULT_FEED_LIMIT;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "seadex-rss")]
#[command(about = "RSS feeds that track changes to SeaDex entries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        #[arg(short, long, default_value = "8888")]
        port: u16,
        #[arg(short = 'H', long, default_value = "0.0.0.0")]
        host: String,
        /// Minutes between upstream checks of the same id
        #[arg(short, long)]
        interval_minutes: Option<i64>,
    },
    /// Refresh an id and print its RSS feed
    Feed { id: TrackedId },
    /// Print stored snapshots for an id as JSON
    History {
        id: TrackedId,
        #[arg(short, long, default_value_t = DEFAULT_FEED_LIMIT)]
        limit: usize,
    },
    /// Run one refresh for an id and print the outcome
    Refresh { id: TrackedId },
    /// List ids with stored snapshots
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries command output; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    match cli.command {
        Commands::Serve { port, host, interval_minutes } => {
            let config = match interval_minutes {
                Some(minutes) => config.with_update_interval_minutes(minutes),
                None => config,
            };
            commands::serve::run(config, host, port).await?;
        },
        Commands::Feed { id } => commands::inspect::feed(&config, id).await?,
        Commands::History { id, limit } => commands::inspect::history(&config, id, limit).await?,
        Commands::Refresh { id } => commands::inspect::refresh(&config, id).await?,
        Commands::List => commands::inspect::list(&config)?,
    }

    Ok(())
}
