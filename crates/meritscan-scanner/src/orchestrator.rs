//! Pipeline orchestrator for candidate lookups.
//!
//! This module provides the `PipelineOrchestrator` which drives every
//! candidate of a range through fetch, solve, submit and classify, retrying
//! rejected answers and transient failures within a per-candidate budget.

use crate::aggregator::{Report, ResultAggregator};
use crate::classifier::{Classification, ResultClassifier};
use crate::error::Result;
use crate::generator::CandidateRange;
use crate::outcome::{CandidateOutcome, FailureReason, Stage};
use crate::retry::RetryPolicy;
use futures::stream::{FuturesUnordered, StreamExt};
use meritscan_core::{CandidateId, ScanningConfig};
use meritscan_portal::{LookupPortal, PortalConnector, PortalError};
use meritscan_solver::{CaptchaSolver, SolvedText};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Tuning for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Retry budget and backoff
    pub retry: RetryPolicy,
    /// Concurrent workers, each with its own portal session
    pub workers: usize,
    /// Deadline for every individual network or solver call
    pub call_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self::from_config(&ScanningConfig::default())
    }
}

impl OrchestratorConfig {
    /// Build from the scanning section of the configuration.
    #[must_use]
    pub fn from_config(config: &ScanningConfig) -> Self {
        Self {
            retry: RetryPolicy::from_config(config),
            workers: config.workers.max(1),
            call_timeout: Duration::from_secs(config.call_timeout_secs),
        }
    }
}

/// Drives candidates through the lookup pipeline.
pub struct PipelineOrchestrator {
    connector: Arc<dyn PortalConnector>,
    solver: Arc<dyn CaptchaSolver>,
    classifier: Arc<ResultClassifier>,
    config: OrchestratorConfig,
}

impl PipelineOrchestrator {
    /// Create a new orchestrator.
    #[must_use]
    pub fn new(
        connector: Arc<dyn PortalConnector>,
        solver: Arc<dyn CaptchaSolver>,
        classifier: Arc<ResultClassifier>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            connector,
            solver,
            classifier,
            config,
        }
    }

    /// Process every candidate in `range` and return the ordered report.
    ///
    /// Every candidate gets exactly one outcome. Cancelling `cancel` stops
    /// the run early; the interrupted candidates and every candidate not yet
    /// started are reported as `Failed(Cancelled)`.
    ///
    /// # Errors
    /// Returns error only if a portal session cannot be opened, which happens
    /// before any candidate is processed.
    pub async fn run(&self, range: &CandidateRange, cancel: CancellationToken) -> Result<Report> {
        let candidates: Vec<CandidateId> = range.iter().collect();
        let worker_count = self.config.workers.min(candidates.len()).max(1);

        let sessions = (0..worker_count)
            .map(|_| self.connector.connect())
            .collect::<std::result::Result<Vec<_>, PortalError>>()?;

        tracing::info!(
            candidates = candidates.len(),
            workers = worker_count,
            max_attempts = self.config.retry.max_attempts(),
            "Starting merit lookup run"
        );

        let aggregator = ResultAggregator::new();
        let cursor = AtomicUsize::new(0);

        let mut workers: FuturesUnordered<_> = sessions
            .iter()
            .enumerate()
            .map(|(worker, session)| {
                self.worker(
                    worker,
                    session.as_ref(),
                    &candidates,
                    &cursor,
                    &aggregator,
                    &cancel,
                )
            })
            .collect();

        while let Some(result) = workers.next().await {
            result?;
        }
        drop(workers);

        for candidate in &candidates {
            if !aggregator.contains(candidate) {
                aggregator.record(
                    candidate.clone(),
                    CandidateOutcome::Failed(FailureReason::Cancelled),
                    0,
                )?;
            }
        }

        let report = aggregator.finalize()?;
        let summary = report.summary();
        tracing::info!(
            matched = summary.matched,
            not_found = summary.not_found,
            failed = summary.failed,
            rows = summary.rows,
            "Merit lookup run finished"
        );
        Ok(report)
    }

    /// Pull candidates from the shared cursor until none remain or the run
    /// is cancelled.
    async fn worker(
        &self,
        worker: usize,
        portal: &dyn LookupPortal,
        candidates: &[CandidateId],
        cursor: &AtomicUsize,
        aggregator: &ResultAggregator,
        cancel: &CancellationToken,
    ) -> Result<()> {
        loop {
            if cancel.is_cancelled() {
                tracing::debug!(worker, "Worker stopping: run cancelled");
                return Ok(());
            }

            let index = cursor.fetch_add(1, Ordering::SeqCst);
            let Some(candidate) = candidates.get(index) else {
                return Ok(());
            };

            let (outcome, attempts) = self.process_candidate(portal, candidate, cancel).await;
            match &outcome {
                CandidateOutcome::Failed(reason) => tracing::warn!(
                    worker,
                    candidate = %candidate,
                    attempts,
                    reason = %reason,
                    "Candidate failed"
                ),
                _ => tracing::info!(
                    worker,
                    candidate = %candidate,
                    attempts,
                    outcome = outcome.tag(),
                    "Candidate finished"
                ),
            }
            aggregator.record(candidate.clone(), outcome, attempts)?;
        }
    }

    /// Run attempt cycles for one candidate until it finishes, the budget is
    /// spent, or the run is cancelled.
    ///
    /// Returns the outcome and the number of attempts started.
    async fn process_candidate(
        &self,
        portal: &dyn LookupPortal,
        candidate: &CandidateId,
        cancel: &CancellationToken,
    ) -> (CandidateOutcome, u32) {
        let policy = &self.config.retry;
        let max_attempts = policy.max_attempts();
        let mut last_reason = FailureReason::Rejected;
        let mut transient_failures = 0;

        for attempt in 1..=max_attempts {
            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    return (CandidateOutcome::Failed(FailureReason::Cancelled), attempt);
                }
                result = self.attempt(portal, candidate) => result,
            };

            match result {
                Ok(Classification::Match(records)) => {
                    return (CandidateOutcome::Matched(records), attempt);
                }
                Ok(Classification::NotFound(record)) => {
                    return (CandidateOutcome::NotFound(record), attempt);
                }
                Ok(Classification::Rejected) => {
                    tracing::debug!(
                        candidate = %candidate,
                        attempt,
                        max_attempts,
                        "CAPTCHA answer rejected, retrying with a fresh challenge"
                    );
                    last_reason = FailureReason::Rejected;
                }
                Err(reason) => {
                    if attempt < max_attempts {
                        let delay = policy.delay_for(transient_failures);
                        tracing::warn!(
                            candidate = %candidate,
                            attempt,
                            max_attempts,
                            reason = %reason,
                            delay_ms = delay.as_millis(),
                            "Attempt failed, retrying"
                        );
                        tokio::select! {
                            biased;
                            () = cancel.cancelled() => {
                                return (CandidateOutcome::Failed(FailureReason::Cancelled), attempt);
                            }
                            () = tokio::time::sleep(delay) => {}
                        }
                    } else {
                        tracing::warn!(
                            candidate = %candidate,
                            attempt,
                            reason = %reason,
                            "Attempt failed, retry budget exhausted"
                        );
                    }
                    transient_failures += 1;
                    last_reason = reason;
                }
            }
        }

        (CandidateOutcome::Failed(last_reason), max_attempts)
    }

    /// One fetch, solve, submit, classify cycle with a fresh challenge.
    async fn attempt(
        &self,
        portal: &dyn LookupPortal,
        candidate: &CandidateId,
    ) -> std::result::Result<Classification, FailureReason> {
        let challenge = self
            .timed(Stage::Challenge, portal.fetch_challenge())
            .await?
            .map_err(|e| FailureReason::ChallengeUnavailable(e.to_string()))?;

        let raw = self
            .timed(
                Stage::Solve,
                self.solver.solve_for(candidate, &challenge.image),
            )
            .await?
            .map_err(|e| FailureReason::Solver(e.to_string()))?;
        let answer = SolvedText::normalize(&raw)
            .map_err(|e| FailureReason::Solver(e.to_string()))?;

        let response = self
            .timed(Stage::Submit, portal.submit(candidate, answer.as_str(), challenge))
            .await?
            .map_err(|e| FailureReason::Submission(e.to_string()))?;

        Ok(self.classifier.classify(candidate, &response))
    }

    async fn timed<F: Future>(
        &self,
        stage: Stage,
        call: F,
    ) -> std::result::Result<F::Output, FailureReason> {
        tokio::time::timeout(self.config.call_timeout, call)
            .await
            .map_err(|_| FailureReason::Timeout(stage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_scanning_section() {
        let scanning = ScanningConfig {
            workers: 0,
            max_retries: 2,
            call_timeout_secs: 7,
            ..ScanningConfig::default()
        };
        let config = OrchestratorConfig::from_config(&scanning);

        assert_eq!(config.workers, 1);
        assert_eq!(config.retry.max_attempts(), 3);
        assert_eq!(config.call_timeout, Duration::from_secs(7));
    }

    #[test]
    fn test_default_is_sequential() {
        assert_eq!(OrchestratorConfig::default().workers, 1);
    }
}
