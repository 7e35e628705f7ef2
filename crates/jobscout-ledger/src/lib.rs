//! Sent-job ledger for jobscout.
//!
//! This crate provides the persisted record of which postings have already
//! been handed to a notifier:
//! - Keys postings by company and URL
//! - Stores the time each key was first notified
//! - Evicts entries older than a retention window
//! - Replaces the on-disk file atomically on save

mod error;
mod key;
mod ledger;

pub use error::LedgerError;
pub use key::{DedupKey, KEY_SEPARATOR, UNKNOWN_COMPANY, normalize_company};
pub use ledger::SentJobLedger;
