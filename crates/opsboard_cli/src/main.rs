//! Opsboard CLI
//!
//! Command-line tools for exercising the opsboard sync core against a
//! backend.
//!
//! # Commands
//!
//! - `domains` - List the synchronized data domains
//! - `fetch` - Fetch one domain's payload and print it
//! - `watch` - Subscribe to a domain and stream view updates

mod client;
mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Opsboard sync command-line tools.
#[derive(Parser)]
#[command(name = "opsboard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Backend base URL
    #[arg(global = true, short, long, default_value = "http://localhost:8787")]
    url: String,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the synchronized data domains
    Domains,

    /// Fetch a domain's payload once and print it
    Fetch {
        /// Domain name (e.g. dashboard-stats)
        domain: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Subscribe to a domain and stream view updates
    Watch {
        /// Domain name (e.g. dashboard-stats)
        domain: String,

        /// Refresh interval in seconds
        #[arg(short, long, default_value_t = 30)]
        interval: u64,

        /// Stop after this many view updates (0 = run until interrupted)
        #[arg(short, long, default_value_t = 0)]
        count: u64,

        /// Disable offline fallback data
        #[arg(long)]
        no_offline: bool,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Domains => {
            commands::domains::run(&cli.url);
        }
        Commands::Fetch { domain, format } => {
            commands::fetch::run(&cli.url, &domain, &format).await?;
        }
        Commands::Watch {
            domain,
            interval,
            count,
            no_offline,
        } => {
            commands::watch::run(&cli.url, &domain, interval, count, no_offline).await?;
        }
        Commands::Version => {
            println!("Opsboard CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
