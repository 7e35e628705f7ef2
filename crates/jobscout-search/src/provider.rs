//! Job search provider interface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Posting, ProviderError};

/// One query as sent to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Job boards to search.
    pub sites: Vec<String>,
    /// Full query string, including company and keyword filters.
    pub query: String,
    pub location: String,
    /// How many results the run still needs.
    pub results_wanted: usize,
    /// Only postings newer than this many hours.
    pub recency_hours: u32,
    pub country_hint: String,
}

/// Source of job postings.
///
/// Implementations may return fewer or more postings than asked for, or
/// none. Errors are treated as a failure of that one query only.
#[async_trait]
pub trait JobSearchProvider: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Posting>, ProviderError>;
}
