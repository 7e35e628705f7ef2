//! Notifier that writes to the log instead of delivering anywhere.

use async_trait::async_trait;
use chrono::Local;
use tracing::{error, info};

use jobscout_search::{NotifyError, Notifier, Posting};

use crate::Digest;

/// Logs each digest at `info` and each error report at `error`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, postings: &[Posting]) -> Result<(), NotifyError> {
        let digest = Digest::build(postings, &Local::now());
        info!(subject = %digest.subject, count = postings.len(), "job digest");
        for line in digest.text.lines().skip(1).filter(|l| !l.is_empty()) {
            info!("{line}");
        }
        Ok(())
    }

    async fn report_error(&self, message: &str, trace: &str) -> Result<(), NotifyError> {
        let digest = Digest::error(message, trace, &Local::now());
        error!(subject = %digest.subject, trace = %trace, "{message}");
        Ok(())
    }
}
