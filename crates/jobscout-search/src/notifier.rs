//! Notification interface.

use async_trait::async_trait;

use crate::{NotifyError, Posting};

/// Delivers postings and error reports to a human.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one batch of new postings.
    async fn notify(&self, postings: &[Posting]) -> Result<(), NotifyError>;

    /// Report a run that failed. Best effort; callers only log failures.
    async fn report_error(&self, message: &str, trace: &str) -> Result<(), NotifyError>;
}
