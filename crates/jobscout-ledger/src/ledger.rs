//! The sent-job ledger.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::{DedupKey, LedgerError};

/// Persisted map from [`DedupKey`] to the time the posting was notified.
///
/// The on-disk form is a single JSON object of
/// `"<company>||<url>": "<RFC 3339 timestamp>"` pairs.
#[derive(Debug, Clone)]
pub struct SentJobLedger {
    path: PathBuf,
    entries: BTreeMap<DedupKey, DateTime<Utc>>,
}

impl SentJobLedger {
    /// Create an empty ledger that will be saved to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Load the ledger from `path`.
    ///
    /// Never fails: a missing file yields an empty ledger, and an unreadable
    /// or malformed file is logged and also yields an empty ledger.
    pub async fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();

        let entries = match fs::read_to_string(&path).await {
            Ok(content) => match parse_entries(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ledger file is malformed, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no ledger file yet, starting empty");
                BTreeMap::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read ledger file, starting empty");
                BTreeMap::new()
            }
        };

        info!(path = %path.display(), entries = entries.len(), "loaded sent-job ledger");
        Self { path, entries }
    }

    /// Path the ledger is saved to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check whether a key has already been notified.
    pub fn contains(&self, key: &DedupKey) -> bool {
        self.entries.contains_key(key)
    }

    /// When a key was notified, if it was.
    pub fn sent_at(&self, key: &DedupKey) -> Option<DateTime<Utc>> {
        self.entries.get(key).copied()
    }

    /// Record that a key was notified at `now`.
    pub fn mark(&mut self, key: DedupKey, now: DateTime<Utc>) {
        self.entries.insert(key, now);
    }

    /// Remove every entry sent before `now - ttl`.
    ///
    /// Returns the number of entries removed. A window reaching past the
    /// earliest representable time removes nothing.
    pub fn evict(&mut self, ttl: Duration, now: DateTime<Utc>) -> usize {
        let Some(cutoff) = now.checked_sub_signed(ttl) else {
            debug!(ttl_days = ttl.num_days(), "retention window predates calendar, nothing to evict");
            return 0;
        };
        let before = self.entries.len();
        self.entries.retain(|_, sent_at| *sent_at >= cutoff);
        let removed = before - self.entries.len();

        if removed > 0 {
            info!(removed, cutoff = %cutoff, "evicted expired ledger entries");
        }
        removed
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&DedupKey, &DateTime<Utc>)> {
        self.entries.iter()
    }

    /// Write the full ledger to disk.
    ///
    /// Writes a sibling temp file and renames it over the target, so a crash
    /// mid-write leaves the previous file intact.
    pub async fn save(&self) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let stored: BTreeMap<&str, String> = self
            .entries
            .iter()
            .map(|(key, sent_at)| (key.as_str(), sent_at.to_rfc3339()))
            .collect();
        let content = serde_json::to_string_pretty(&stored)?;

        let temp_path = self.temp_path();
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;

        fs::rename(&temp_path, &self.path).await?;

        debug!(path = %self.path.display(), entries = self.entries.len(), "saved sent-job ledger");
        Ok(())
    }

    /// `<file name>.tmp` next to the ledger; never equal to the ledger path.
    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

fn parse_entries(content: &str) -> Result<BTreeMap<DedupKey, DateTime<Utc>>, serde_json::Error> {
    let raw: BTreeMap<String, String> = serde_json::from_str(content)?;

    let mut entries = BTreeMap::new();
    for (key, stamp) in raw {
        match parse_timestamp(&stamp) {
            Some(sent_at) => {
                entries.insert(DedupKey::from_stored(key), sent_at);
            }
            None => warn!(key = %key, stamp = %stamp, "dropping ledger entry with unreadable timestamp"),
        }
    }
    Ok(entries)
}

/// Accepts RFC 3339, and offset-less ISO-8601 read as UTC.
fn parse_timestamp(stamp: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(stamp) {
        return Some(ts.with_timezone(&Utc));
    }
    stamp
        .parse::<NaiveDateTime>()
        .ok()
        .map(|naive| naive.and_utc())
}
