//! Posting and phase types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use jobscout_ledger::{DedupKey, normalize_company};

/// A candidate job listing returned by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    /// Posting URL; identity within one provider response.
    #[serde(alias = "job_url")]
    pub url: String,
    #[serde(default)]
    pub title: String,
    /// Hiring company, if the provider knew it.
    #[serde(default)]
    pub company: Option<String>,
    /// Job board the posting came from.
    #[serde(default, alias = "site_name")]
    pub site: String,
    /// Any other fields the provider returned.
    #[serde(flatten)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Posting {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        company: Option<String>,
        site: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            company,
            site: site.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Company name with the placeholder applied.
    pub fn company_name(&self) -> &str {
        normalize_company(self.company.as_deref())
    }

    /// Key used to decide whether this posting was already notified.
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey::new(self.company.as_deref(), &self.url)
    }
}

/// Stage of the search strategy that produced a query or posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Queries restricted to the priority company list.
    Priority,
    /// Per-role queries with no company restriction.
    Fallback,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Priority => f.write_str("priority"),
            Phase::Fallback => f.write_str("fallback"),
        }
    }
}
