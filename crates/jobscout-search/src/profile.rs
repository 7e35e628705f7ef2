//! Search profile configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::SearchError;

/// Default number of new postings delivered per run.
pub const DEFAULT_QUOTA: usize = 10;

/// Default number of companies per priority query.
pub const DEFAULT_CHUNK_SIZE: usize = 20;

/// Largest company chunk a single query may carry.
pub const MAX_CHUNK_SIZE: usize = 20;

/// Default ledger retention window.
pub const DEFAULT_RETENTION_DAYS: u32 = 7;

/// Everything that shapes one search run.
///
/// Loaded from JSON with camelCase keys; any omitted field takes its
/// default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchProfile {
    /// Role phrases, searched in order.
    pub roles: Vec<String>,
    /// Companies searched first, in order.
    pub priority_companies: Vec<String>,
    /// Terms every query must contain.
    pub required_keywords: Vec<String>,
    /// Terms every query excludes.
    pub excluded_keywords: Vec<String>,
    /// Companies per priority query (1..=20).
    pub chunk_size: usize,
    /// Maximum new postings delivered per run.
    pub quota: usize,
    /// Job boards passed to the provider.
    pub sites: Vec<String>,
    pub location: String,
    /// Provider recency window per query.
    pub recency_hours: u32,
    pub country_hint: String,
    /// URL fragments that mark a posting as unusable.
    pub blocked_url_fragments: Vec<String>,
    /// Ledger retention in days; `None` keeps entries forever.
    pub retention_days: Option<u32>,
}

impl Default for SearchProfile {
    fn default() -> Self {
        Self {
            roles: vec!["Data Analyst".to_string()],
            priority_companies: Vec::new(),
            required_keywords: Vec::new(),
            excluded_keywords: Vec::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            quota: DEFAULT_QUOTA,
            sites: vec![
                "linkedin".to_string(),
                "indeed".to_string(),
                "glassdoor".to_string(),
            ],
            location: "United States".to_string(),
            recency_hours: 3,
            country_hint: "USA".to_string(),
            blocked_url_fragments: vec!["example.com".to_string()],
            retention_days: Some(DEFAULT_RETENTION_DAYS),
        }
    }
}

impl SearchProfile {
    /// Check that the profile can drive a run.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.roles.is_empty() {
            return Err(SearchError::InvalidProfile(
                "at least one role is required".to_string(),
            ));
        }

        if self.roles.iter().any(|r| r.trim().is_empty()) {
            return Err(SearchError::InvalidProfile(
                "roles cannot be blank".to_string(),
            ));
        }

        if !(1..=MAX_CHUNK_SIZE).contains(&self.chunk_size) {
            return Err(SearchError::InvalidProfile(format!(
                "chunk size must be between 1 and {MAX_CHUNK_SIZE}, got {}",
                self.chunk_size
            )));
        }

        if self.quota == 0 {
            return Err(SearchError::InvalidProfile(
                "quota must be at least 1".to_string(),
            ));
        }

        if self.sites.is_empty() {
            return Err(SearchError::InvalidProfile(
                "at least one site is required".to_string(),
            ));
        }

        Ok(())
    }

    /// Ledger retention window, if eviction is enabled.
    pub fn retention(&self) -> Option<Duration> {
        self.retention_days.map(|days| Duration::days(i64::from(days)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_profile_is_valid() {
        assert!(SearchProfile::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let profile: SearchProfile = serde_json::from_value(json!({
            "roles": ["Business Analyst"],
            "priorityCompanies": ["Acme", "Globex"],
            "quota": 5
        }))
        .unwrap();

        assert_eq!(profile.roles, vec!["Business Analyst"]);
        assert_eq!(profile.priority_companies.len(), 2);
        assert_eq!(profile.quota, 5);
        assert_eq!(profile.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(profile.retention_days, Some(DEFAULT_RETENTION_DAYS));
    }

    #[test]
    fn test_null_retention_disables_eviction() {
        let profile: SearchProfile =
            serde_json::from_value(json!({ "retentionDays": null })).unwrap();
        assert_eq!(profile.retention_days, None);
        assert!(profile.retention().is_none());
    }

    #[test]
    fn test_retention_in_days() {
        let profile = SearchProfile::default();
        assert_eq!(profile.retention(), Some(Duration::days(7)));
    }

    #[test]
    fn test_validate_rejects_bad_profiles() {
        let no_roles = SearchProfile {
            roles: vec![],
            ..Default::default()
        };
        assert!(no_roles.validate().is_err());

        let blank_role = SearchProfile {
            roles: vec!["  ".to_string()],
            ..Default::default()
        };
        assert!(blank_role.validate().is_err());

        let zero_chunk = SearchProfile {
            chunk_size: 0,
            ..Default::default()
        };
        assert!(zero_chunk.validate().is_err());

        let huge_chunk = SearchProfile {
            chunk_size: MAX_CHUNK_SIZE + 1,
            ..Default::default()
        };
        assert!(huge_chunk.validate().is_err());

        let zero_quota = SearchProfile {
            quota: 0,
            ..Default::default()
        };
        assert!(zero_quota.validate().is_err());

        let no_sites = SearchProfile {
            sites: vec![],
            ..Default::default()
        };
        assert!(no_sites.validate().is_err());
    }
}
