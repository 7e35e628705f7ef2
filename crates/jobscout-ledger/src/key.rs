//! Deduplication keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator between the company and URL halves of a key.
pub const KEY_SEPARATOR: &str = "||";

/// Placeholder used when a posting carries no company name.
pub const UNKNOWN_COMPANY: &str = "Unknown Company";

/// Identity of a notified posting: `"<company>||<url>"`.
///
/// Matching is exact and case-sensitive. URLs are not normalized, so
/// `https://a/1` and `https://a/1/` are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DedupKey(String);

impl DedupKey {
    /// Build a key from a posting's company and URL.
    pub fn new(company: Option<&str>, url: &str) -> Self {
        Self(format!(
            "{}{}{}",
            normalize_company(company),
            KEY_SEPARATOR,
            url
        ))
    }

    /// Wrap a key read back from storage.
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Return the company name to use in keys and digests.
///
/// Absent or blank names become [`UNKNOWN_COMPANY`]; anything else is
/// returned untouched.
pub fn normalize_company(company: Option<&str>) -> &str {
    company
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(UNKNOWN_COMPANY)
}
