//! jobscout: scheduled job-posting search with de-duplicated digests
//!
//! Main binary with subcommands:
//! - `run`: search, notify, and record what was sent
//! - `plan`: print the queries a run would issue
//! - `ledger show`: list sent postings
//! - `ledger prune`: drop old ledger entries

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod ledger;
mod run;

#[derive(Parser)]
#[command(name = "jobscout")]
#[command(about = "Search job boards and send digests of new postings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one search and notify about new postings
    Run {
        /// Search profile (JSON); defaults to the built-in profile
        #[arg(long, env = "JOBSCOUT_PROFILE")]
        profile: Option<PathBuf>,

        /// Sent-job ledger file
        #[arg(long, env = "JOBSCOUT_LEDGER")]
        ledger: Option<PathBuf>,

        /// Scraper command; receives a request as JSON on stdin, prints postings as JSON
        #[arg(long, env = "JOBSCOUT_PROVIDER_CMD")]
        provider_cmd: String,

        /// Seconds allowed per scraper invocation
        #[arg(long, default_value = "120")]
        provider_timeout: u64,

        /// Webhook for digests and error reports; without it digests are logged
        #[arg(long, env = "JOBSCOUT_WEBHOOK_URL")]
        webhook_url: Option<String>,
    },

    /// Print the queries a run would issue
    Plan {
        /// Search profile (JSON); defaults to the built-in profile
        #[arg(long, env = "JOBSCOUT_PROFILE")]
        profile: Option<PathBuf>,
    },

    /// Inspect or maintain the sent-job ledger
    Ledger {
        /// Sent-job ledger file
        #[arg(long, env = "JOBSCOUT_LEDGER", global = true)]
        ledger: Option<PathBuf>,

        #[command(subcommand)]
        command: LedgerCommands,
    },
}

#[derive(Subcommand)]
enum LedgerCommands {
    /// List sent postings, oldest first
    Show,

    /// Drop entries older than the given number of days
    Prune {
        #[arg(long, default_value = "7")]
        days: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "jobscout=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            profile,
            ledger,
            provider_cmd,
            provider_timeout,
            webhook_url,
        } => {
            run::run(
                profile.as_deref(),
                config::ledger_path(ledger),
                &provider_cmd,
                Duration::from_secs(provider_timeout),
                webhook_url,
            )
            .await
        }

        Commands::Plan { profile } => run::plan(profile.as_deref()).await,

        Commands::Ledger { ledger, command } => {
            let path = config::ledger_path(ledger);
            match command {
                LedgerCommands::Show => ledger::show(&path).await,
                LedgerCommands::Prune { days } => ledger::prune(&path, days).await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ledger_prune() {
        let cli = Cli::try_parse_from([
            "jobscout", "ledger", "prune", "--days", "3", "--ledger", "/tmp/l.json",
        ])
        .unwrap();

        match cli.command {
            Commands::Ledger {
                ledger,
                command: LedgerCommands::Prune { days },
            } => {
                assert_eq!(days, 3);
                assert_eq!(ledger, Some(PathBuf::from("/tmp/l.json")));
            }
            _ => panic!("expected ledger prune"),
        }
    }
}
