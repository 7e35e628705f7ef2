//! Quota-filling aggregation of provider results.

use std::collections::HashSet;

use tracing::debug;

use jobscout_ledger::{DedupKey, SentJobLedger};

use crate::{Phase, Posting};

/// A posting accepted into this run, tagged with the phase that found it.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedPosting {
    pub posting: Posting,
    pub phase: Phase,
}

/// True if the posting's key has never been notified.
pub fn is_unsent(posting: &Posting, ledger: &SentJobLedger) -> bool {
    !ledger.contains(&posting.dedup_key())
}

#[derive(Debug, Clone, Copy)]
enum Rejection {
    MissingUrl,
    BlockedUrl,
    DuplicateUrl,
    AlreadySent,
    DuplicateKey,
}

/// Accumulates unique, unsent postings up to a quota.
///
/// Accepted postings keep first-seen order. Because the orchestrator feeds
/// every priority batch before any fallback batch, the collection is
/// priority-first without any sorting here.
#[derive(Debug)]
pub struct ResultAggregator {
    quota: usize,
    blocked_url_fragments: Vec<String>,
    accepted: Vec<AcceptedPosting>,
    seen_keys: HashSet<DedupKey>,
    seen_urls: HashSet<String>,
}

impl ResultAggregator {
    pub fn new(quota: usize) -> Self {
        Self {
            quota,
            blocked_url_fragments: Vec::new(),
            accepted: Vec::new(),
            seen_keys: HashSet::new(),
            seen_urls: HashSet::new(),
        }
    }

    /// Reject postings whose URL contains any of these fragments.
    pub fn with_blocked_url_fragments(mut self, fragments: Vec<String>) -> Self {
        self.blocked_url_fragments = fragments.into_iter().filter(|f| !f.is_empty()).collect();
        self
    }

    /// Offer a provider batch, in provider order.
    ///
    /// Stops taking postings as soon as the quota is reached, even part way
    /// through the batch. Returns how many postings were accepted.
    pub fn accept(
        &mut self,
        batch: impl IntoIterator<Item = Posting>,
        phase: Phase,
        ledger: &SentJobLedger,
    ) -> usize {
        let mut taken = 0;

        for posting in batch {
            if self.is_full() {
                break;
            }

            let key = posting.dedup_key();
            if let Some(reason) = self.rejection(&posting, &key, ledger) {
                debug!(url = %posting.url, reason = ?reason, "rejected posting");
                continue;
            }

            self.seen_urls.insert(posting.url.clone());
            self.seen_keys.insert(key);
            self.accepted.push(AcceptedPosting { posting, phase });
            taken += 1;
        }

        taken
    }

    fn rejection(
        &self,
        posting: &Posting,
        key: &DedupKey,
        ledger: &SentJobLedger,
    ) -> Option<Rejection> {
        if posting.url.trim().is_empty() {
            return Some(Rejection::MissingUrl);
        }
        if self
            .blocked_url_fragments
            .iter()
            .any(|fragment| posting.url.contains(fragment.as_str()))
        {
            return Some(Rejection::BlockedUrl);
        }
        if self.seen_urls.contains(&posting.url) {
            return Some(Rejection::DuplicateUrl);
        }
        if !is_unsent(posting, ledger) {
            return Some(Rejection::AlreadySent);
        }
        if self.seen_keys.contains(key) {
            return Some(Rejection::DuplicateKey);
        }
        None
    }

    pub fn quota(&self) -> usize {
        self.quota
    }

    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }

    /// Postings still needed to reach the quota.
    pub fn remaining(&self) -> usize {
        self.quota.saturating_sub(self.accepted.len())
    }

    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }

    pub fn accepted(&self) -> &[AcceptedPosting] {
        &self.accepted
    }

    pub fn into_accepted(self) -> Vec<AcceptedPosting> {
        self.accepted
    }
}
