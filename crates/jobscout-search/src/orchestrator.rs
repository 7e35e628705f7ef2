//! Search run orchestration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use jobscout_ledger::SentJobLedger;

use crate::{
    AcceptedPosting, JobSearchProvider, Notifier, Phase, PlannedQuery, Posting, QueryPlanner,
    ResultAggregator, SearchError, SearchProfile, SearchRequest, is_unsent,
};

/// Where a run is in the two-phase search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Issuing company-restricted queries.
    Priority,
    /// Issuing per-role queries with no company restriction.
    Fallback,
    /// No more queries; finalize and notify.
    Done,
}

/// What a completed run did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// Postings handed to the notifier, in delivery order.
    pub delivered: Vec<Posting>,
    /// How many delivered postings came from the priority phase.
    pub priority_accepted: usize,
    /// How many delivered postings came from the fallback phase.
    pub fallback_accepted: usize,
    /// Provider calls made.
    pub queries_issued: usize,
    /// Provider calls that failed.
    pub query_failures: usize,
    /// Ledger entries evicted at run start.
    pub evicted: usize,
    /// Whether the ledger was written back.
    pub persisted: bool,
}

/// Result of one run. Runs never return an error to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// New postings were delivered.
    Notified(RunReport),
    /// Nothing new was found; no notification and no ledger write.
    NothingNew(RunReport),
    /// The run aborted and an error report was attempted.
    Failed { message: String },
}

impl RunOutcome {
    pub fn report(&self) -> Option<&RunReport> {
        match self {
            RunOutcome::Notified(report) | RunOutcome::NothingNew(report) => Some(report),
            RunOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RunOutcome::Failed { .. })
    }
}

#[derive(Debug, Default)]
struct QueryStats {
    issued: usize,
    failures: usize,
}

/// Drives the planner, provider, aggregator, notifier and ledger for one run.
pub struct SearchOrchestrator {
    profile: SearchProfile,
    provider: Arc<dyn JobSearchProvider>,
    notifier: Arc<dyn Notifier>,
    ledger_path: PathBuf,
}

impl SearchOrchestrator {
    pub fn new(
        profile: SearchProfile,
        provider: Arc<dyn JobSearchProvider>,
        notifier: Arc<dyn Notifier>,
        ledger_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            profile,
            provider,
            notifier,
            ledger_path: ledger_path.into(),
        }
    }

    pub fn profile(&self) -> &SearchProfile {
        &self.profile
    }

    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    /// Run once using the current time.
    pub async fn run(&self) -> RunOutcome {
        self.run_at(Utc::now()).await
    }

    /// Run once with `now` as the run timestamp.
    ///
    /// Per-query provider failures are absorbed. Anything else is reported
    /// through [`Notifier::report_error`] and returned as
    /// [`RunOutcome::Failed`].
    #[tracing::instrument(skip(self), fields(quota = self.profile.quota))]
    pub async fn run_at(&self, now: DateTime<Utc>) -> RunOutcome {
        match self.try_run(now).await {
            Ok(report) if report.delivered.is_empty() => {
                info!(
                    queries = report.queries_issued,
                    failures = report.query_failures,
                    "no new postings this run"
                );
                RunOutcome::NothingNew(report)
            }
            Ok(report) => {
                info!(
                    delivered = report.delivered.len(),
                    priority = report.priority_accepted,
                    fallback = report.fallback_accepted,
                    queries = report.queries_issued,
                    failures = report.query_failures,
                    persisted = report.persisted,
                    "run complete"
                );
                RunOutcome::Notified(report)
            }
            Err(e) => {
                let message = e.to_string();
                let trace = error_trace(&e);
                error!(error = %message, "search run failed");

                if let Err(report_err) = self.notifier.report_error(&message, &trace).await {
                    error!(error = %report_err, "failed to send error report");
                }
                RunOutcome::Failed { message }
            }
        }
    }

    async fn try_run(&self, now: DateTime<Utc>) -> Result<RunReport, SearchError> {
        self.profile.validate()?;

        let mut ledger = SentJobLedger::load(&self.ledger_path).await;
        let evicted = match self.profile.retention() {
            Some(ttl) => ledger.evict(ttl, now),
            None => 0,
        };

        let planner = QueryPlanner::from_profile(&self.profile);
        let mut aggregator = ResultAggregator::new(self.profile.quota)
            .with_blocked_url_fragments(self.profile.blocked_url_fragments.clone());
        let mut stats = QueryStats::default();

        let mut state = RunState::Priority;
        loop {
            state = match state {
                RunState::Priority => {
                    self.drive(planner.priority_queries(), &mut aggregator, &ledger, &mut stats)
                        .await;
                    if aggregator.is_full() {
                        RunState::Done
                    } else {
                        info!(
                            accepted = aggregator.accepted_count(),
                            remaining = aggregator.remaining(),
                            "priority phase left quota unmet, falling back"
                        );
                        RunState::Fallback
                    }
                }
                RunState::Fallback => {
                    self.drive(planner.fallback_queries(), &mut aggregator, &ledger, &mut stats)
                        .await;
                    RunState::Done
                }
                RunState::Done => break,
            };
        }

        self.finish(aggregator.into_accepted(), ledger, now, stats, evicted)
            .await
    }

    /// Issue queries in order until they run out or the quota is met.
    async fn drive(
        &self,
        queries: impl Iterator<Item = PlannedQuery>,
        aggregator: &mut ResultAggregator,
        ledger: &SentJobLedger,
        stats: &mut QueryStats,
    ) {
        for planned in queries {
            let remaining = aggregator.remaining();
            if remaining == 0 {
                debug!(phase = %planned.phase, "quota reached, skipping remaining queries");
                break;
            }

            let request = self.request_for(&planned, remaining);
            stats.issued += 1;

            match self.provider.search(&request).await {
                Ok(batch) => {
                    let returned = batch.len();
                    let accepted = aggregator.accept(batch, planned.phase, ledger);
                    debug!(
                        phase = %planned.phase,
                        query = %planned.query,
                        returned,
                        accepted,
                        "query complete"
                    );
                }
                Err(e) => {
                    stats.failures += 1;
                    warn!(
                        phase = %planned.phase,
                        query = %planned.query,
                        error = %e,
                        "search query failed, continuing"
                    );
                }
            }
        }
    }

    fn request_for(&self, planned: &PlannedQuery, results_wanted: usize) -> SearchRequest {
        SearchRequest {
            sites: self.profile.sites.clone(),
            query: planned.query.clone(),
            location: self.profile.location.clone(),
            results_wanted,
            recency_hours: self.profile.recency_hours,
            country_hint: self.profile.country_hint.clone(),
        }
    }

    async fn finish(
        &self,
        mut accepted: Vec<AcceptedPosting>,
        mut ledger: SentJobLedger,
        now: DateTime<Utc>,
        stats: QueryStats,
        evicted: usize,
    ) -> Result<RunReport, SearchError> {
        accepted.truncate(self.profile.quota);

        let before = accepted.len();
        accepted.retain(|a| is_unsent(&a.posting, &ledger));
        if accepted.len() < before {
            warn!(
                dropped = before - accepted.len(),
                "final ledger check dropped already-sent postings"
            );
        }

        let priority_accepted = accepted
            .iter()
            .filter(|a| a.phase == Phase::Priority)
            .count();
        let fallback_accepted = accepted.len() - priority_accepted;
        let delivered: Vec<Posting> = accepted.into_iter().map(|a| a.posting).collect();

        let mut report = RunReport {
            delivered,
            priority_accepted,
            fallback_accepted,
            queries_issued: stats.issued,
            query_failures: stats.failures,
            evicted,
            persisted: false,
        };

        if report.delivered.is_empty() {
            return Ok(report);
        }

        self.notifier.notify(&report.delivered).await?;

        for posting in &report.delivered {
            ledger.mark(posting.dedup_key(), now);
        }

        report.persisted = match ledger.save().await {
            Ok(()) => true,
            Err(e) => {
                error!(
                    path = %ledger.path().display(),
                    error = %e,
                    "failed to persist ledger after notifying"
                );
                false
            }
        };

        Ok(report)
    }
}

/// Render an error and its causes, one per line.
pub fn error_trace(error: &(dyn std::error::Error + 'static)) -> String {
    let mut lines = vec![format!("0: {error}")];
    let mut source = error.source();
    let mut depth = 1;
    while let Some(cause) = source {
        lines.push(format!("{depth}: {cause}"));
        source = cause.source();
        depth += 1;
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NotifyError;

    #[test]
    fn test_error_trace_lists_causes() {
        let err = SearchError::Notify(NotifyError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        });

        let trace = error_trace(&err);
        let lines: Vec<&str> = trace.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("0: notification failed"));
        assert_eq!(lines[1], "1: unexpected status 502: bad gateway");
    }

    #[test]
    fn test_error_trace_single_error() {
        let err = SearchError::InvalidProfile("no roles".to_string());
        assert_eq!(error_trace(&err), "0: invalid search profile: no roles");
    }

    #[test]
    fn test_outcome_report_accessor() {
        let report = RunReport::default();
        assert!(RunOutcome::NothingNew(report.clone()).report().is_some());
        assert!(RunOutcome::Notified(report).report().is_some());

        let failed = RunOutcome::Failed {
            message: "boom".to_string(),
        };
        assert!(failed.report().is_none());
        assert!(failed.is_failed());
    }
}
