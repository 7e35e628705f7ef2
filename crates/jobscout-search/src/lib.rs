//! Search-and-dedup engine for jobscout.
//!
//! This crate provides the core of a periodic job search run:
//! - Plans priority-company queries, then per-role fallback queries
//! - Fills a per-run quota with postings not seen before
//! - Deduplicates against the persisted sent-job ledger
//! - Hands one batch to a notifier and records what was sent

mod aggregator;
mod error;
mod notifier;
mod orchestrator;
mod planner;
mod profile;
mod provider;
mod types;

pub use aggregator::{AcceptedPosting, ResultAggregator, is_unsent};
pub use error::{NotifyError, ProviderError, SearchError};
pub use notifier::Notifier;
pub use orchestrator::{RunOutcome, RunReport, RunState, SearchOrchestrator, error_trace};
pub use planner::{PlannedQuery, QueryPlanner};
pub use profile::{
    DEFAULT_CHUNK_SIZE, DEFAULT_QUOTA, DEFAULT_RETENTION_DAYS, MAX_CHUNK_SIZE, SearchProfile,
};
pub use provider::{JobSearchProvider, SearchRequest};
pub use types::{Phase, Posting};

pub use jobscout_ledger::{DedupKey, SentJobLedger};
