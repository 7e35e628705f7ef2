//! The `run` and `plan` subcommands.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use miette::Result;
use tracing::info;

use jobscout_notify::{LogNotifier, WebhookNotifier};
use jobscout_provider::CommandProvider;
use jobscout_search::{Notifier, QueryPlanner, RunOutcome, SearchOrchestrator};

use crate::config;

/// Run one search, notify, and update the ledger.
///
/// A bad profile fails here before any notifier exists, so it is never
/// sent as an error report; the orchestrator's own validation only guards
/// library callers.
pub async fn run(
    profile_path: Option<&Path>,
    ledger_path: PathBuf,
    provider_cmd: &str,
    provider_timeout: Duration,
    webhook_url: Option<String>,
) -> Result<()> {
    let profile = config::load_profile(profile_path).await?;

    let provider = CommandProvider::from_command_line(provider_cmd)
        .ok_or_else(|| miette::miette!("provider command is empty"))?
        .with_timeout(provider_timeout);

    let notifier: Arc<dyn Notifier> = match webhook_url {
        Some(url) => {
            info!(url = %url, "delivering digests to webhook");
            Arc::new(WebhookNotifier::new(url))
        }
        None => {
            info!("no webhook configured, digests go to the log");
            Arc::new(LogNotifier::new())
        }
    };

    let orchestrator = SearchOrchestrator::new(profile, Arc::new(provider), notifier, ledger_path);

    match orchestrator.run().await {
        RunOutcome::Notified(report) => {
            println!(
                "Delivered {} postings ({} priority, {} fallback) from {} queries",
                report.delivered.len(),
                report.priority_accepted,
                report.fallback_accepted,
                report.queries_issued
            );
            if !report.persisted {
                println!("Warning: ledger was not saved; these postings may be sent again");
            }
            Ok(())
        }
        RunOutcome::NothingNew(report) => {
            println!(
                "No new postings ({} queries, {} failed)",
                report.queries_issued, report.query_failures
            );
            Ok(())
        }
        RunOutcome::Failed { message } => Err(miette::miette!("search run failed: {}", message)),
    }
}

/// Print the queries a run would issue, in order.
pub async fn plan(profile_path: Option<&Path>) -> Result<()> {
    let profile = config::load_profile(profile_path).await?;
    let planner = QueryPlanner::from_profile(&profile);

    for planned in planner.queries() {
        println!("{:<8}  {}", planned.phase.to_string(), planned.query);
    }
    Ok(())
}
