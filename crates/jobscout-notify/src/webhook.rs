//! Notifier that POSTs JSON to a webhook.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, instrument};

use jobscout_search::{NotifyError, Notifier, Posting};

use crate::Digest;

#[derive(Serialize)]
struct DigestPayload<'a> {
    subject: &'a str,
    text: &'a str,
    postings: &'a [Posting],
}

#[derive(Serialize)]
struct ErrorPayload<'a> {
    subject: &'a str,
    text: &'a str,
    trace: &'a str,
}

/// Delivers digests and error reports to an HTTP endpoint.
///
/// Digests are sent as `{subject, text, postings}` and error reports as
/// `{subject, text, trace}`. Any non-2xx response is a failure.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    http: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self::with_client(http, url)
    }

    pub fn with_client(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post<T: Serialize>(&self, payload: &T) -> Result<(), NotifyError> {
        let response = self
            .http
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!(status = status.as_u16(), "webhook accepted payload");
        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    #[instrument(skip(self, postings), fields(url = %self.url, count = postings.len()))]
    async fn notify(&self, postings: &[Posting]) -> Result<(), NotifyError> {
        let digest = Digest::build(postings, &Local::now());
        self.post(&DigestPayload {
            subject: &digest.subject,
            text: &digest.text,
            postings,
        })
        .await
    }

    #[instrument(skip(self, message, trace), fields(url = %self.url))]
    async fn report_error(&self, message: &str, trace: &str) -> Result<(), NotifyError> {
        let digest = Digest::error(message, trace, &Local::now());
        self.post(&ErrorPayload {
            subject: &digest.subject,
            text: &digest.text,
            trace,
        })
        .await
    }
}
