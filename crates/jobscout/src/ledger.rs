//! The `ledger` subcommands.

use std::path::Path;

use chrono::{Duration, Utc};
use miette::Result;

use jobscout_ledger::SentJobLedger;

/// Print every ledger entry, oldest first.
pub async fn show(path: &Path) -> Result<()> {
    let ledger = SentJobLedger::load(path).await;

    let mut entries: Vec<_> = ledger.iter().collect();
    entries.sort_by_key(|(_, sent_at)| **sent_at);

    for (key, sent_at) in &entries {
        println!("{}  {}", sent_at.to_rfc3339(), key);
    }
    println!("{} entries in {}", entries.len(), path.display());
    Ok(())
}

/// Drop entries older than `days` and save the ledger.
pub async fn prune(path: &Path, days: u32) -> Result<()> {
    let mut ledger = SentJobLedger::load(path).await;
    let evicted = ledger.evict(Duration::days(i64::from(days)), Utc::now());

    if evicted > 0 {
        ledger
            .save()
            .await
            .map_err(|e| miette::miette!("failed to save ledger {}: {}", path.display(), e))?;
    }

    println!("Pruned {} entries, {} remain", evicted, ledger.len());
    Ok(())
}
