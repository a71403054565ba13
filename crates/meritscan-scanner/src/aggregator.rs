//! Collection of per-candidate outcomes into the run report.

use crate::error::{Result, ScanError};
use crate::outcome::CandidateOutcome;
use meritscan_core::{CandidateId, MeritRecord, Timestamp};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// One candidate's final outcome and how many attempts it took.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    /// The looked-up candidate
    pub candidate: CandidateId,
    /// Terminal outcome
    pub outcome: CandidateOutcome,
    /// Attempt cycles started for the candidate
    pub attempts: u32,
}

impl ReportEntry {
    /// Records this entry contributes to the report, one per merit row.
    ///
    /// `NotFound` and `Failed` entries contribute a single degraded record
    /// with the same shape as a matched one.
    #[must_use]
    pub fn records(&self) -> Vec<MeritRecord> {
        match &self.outcome {
            CandidateOutcome::Matched(records) => records.clone(),
            CandidateOutcome::NotFound(record) => vec![record.clone()],
            CandidateOutcome::Failed(_) => vec![MeritRecord::unavailable(&self.candidate)],
        }
    }
}

/// A flattened report row tagged with the outcome that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    /// Row values
    #[serde(flatten)]
    pub record: MeritRecord,
    /// Outcome tag (`matched`, `not_found`, `failed`)
    pub outcome: &'static str,
}

/// Outcome counts of a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    /// Candidates in the report
    pub candidates: usize,
    /// Candidates with merit rows
    pub matched: usize,
    /// Candidates whose result page had no merit rows
    pub not_found: usize,
    /// Candidates that ended in failure
    pub failed: usize,
    /// Flattened rows across all candidates
    pub rows: usize,
}

/// The complete, ordered outcome of one run. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    generated_at: Timestamp,
    summary: ReportSummary,
    entries: Vec<ReportEntry>,
}

impl Report {
    /// Entries in candidate order.
    #[must_use]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Outcome counts.
    #[must_use]
    pub fn summary(&self) -> ReportSummary {
        self.summary
    }

    /// When the report was finalized.
    #[must_use]
    pub fn generated_at(&self) -> &Timestamp {
        &self.generated_at
    }

    /// Flattened rows in candidate order.
    #[must_use]
    pub fn rows(&self) -> Vec<ReportRow> {
        self.entries
            .iter()
            .flat_map(|entry| {
                let tag = entry.outcome.tag();
                entry
                    .records()
                    .into_iter()
                    .map(move |record| ReportRow { record, outcome: tag })
            })
            .collect()
    }
}

/// Thread-safe sink for candidate outcomes.
///
/// Workers record outcomes in completion order; [`ResultAggregator::finalize`]
/// restores candidate order.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    entries: Mutex<BTreeMap<CandidateId, ReportEntry>>,
}

impl ResultAggregator {
    /// Create an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome for `candidate`.
    ///
    /// # Errors
    /// Returns [`ScanError::DuplicateOutcome`] if `candidate` already has one.
    pub fn record(
        &self,
        candidate: CandidateId,
        outcome: CandidateOutcome,
        attempts: u32,
    ) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| ScanError::Internal("result aggregator lock poisoned".to_string()))?;

        if entries.contains_key(&candidate) {
            return Err(ScanError::DuplicateOutcome {
                candidate: candidate.to_string(),
            });
        }

        entries.insert(
            candidate.clone(),
            ReportEntry {
                candidate,
                outcome,
                attempts,
            },
        );
        Ok(())
    }

    /// Whether `candidate` already has an outcome.
    #[must_use]
    pub fn contains(&self, candidate: &CandidateId) -> bool {
        self.entries
            .lock()
            .map(|entries| entries.contains_key(candidate))
            .unwrap_or(false)
    }

    /// Number of recorded outcomes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build the report, ordered by candidate.
    pub fn finalize(self) -> Result<Report> {
        let entries: Vec<ReportEntry> = self
            .entries
            .into_inner()
            .map_err(|_| ScanError::Internal("result aggregator lock poisoned".to_string()))?
            .into_values()
            .collect();

        let mut summary = ReportSummary {
            candidates: entries.len(),
            ..ReportSummary::default()
        };
        for entry in &entries {
            match &entry.outcome {
                CandidateOutcome::Matched(records) => {
                    summary.matched += 1;
                    summary.rows += records.len();
                }
                CandidateOutcome::NotFound(_) => {
                    summary.not_found += 1;
                    summary.rows += 1;
                }
                CandidateOutcome::Failed(_) => {
                    summary.failed += 1;
                    summary.rows += 1;
                }
            }
        }

        Ok(Report {
            generated_at: Timestamp::now(),
            summary,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::FailureReason;
    use meritscan_core::UNAVAILABLE;
    use std::sync::Arc;

    fn id(number: u64) -> CandidateId {
        CandidateId::new(number, "244", 6).expect("valid candidate")
    }

    fn matched(candidate: &CandidateId, rows: usize) -> CandidateOutcome {
        let records = (1..=rows)
            .map(|n| MeritRecord {
                selection_list_no: n.to_string(),
                programme: format!("Programme {n}"),
                merit_position: (n * 10).to_string(),
                status: "Selected".to_string(),
                ..MeritRecord::unavailable(candidate)
            })
            .collect();
        CandidateOutcome::Matched(records)
    }

    #[test]
    fn test_finalize_orders_by_candidate() {
        let aggregator = ResultAggregator::new();
        for number in [100_002, 100_000, 100_001] {
            aggregator
                .record(id(number), CandidateOutcome::Failed(FailureReason::Rejected), 1)
                .expect("record");
        }

        let report = aggregator.finalize().expect("finalize");
        let order: Vec<_> = report
            .entries()
            .iter()
            .map(|entry| entry.candidate.number())
            .collect();
        assert_eq!(order, vec![100_000, 100_001, 100_002]);
    }

    #[test]
    fn test_duplicate_outcome_is_rejected() {
        let aggregator = ResultAggregator::new();
        aggregator
            .record(id(1), CandidateOutcome::Failed(FailureReason::Cancelled), 0)
            .expect("first record");

        let second = aggregator.record(id(1), matched(&id(1), 1), 1);
        assert!(matches!(second, Err(ScanError::DuplicateOutcome { .. })));
        assert_eq!(aggregator.len(), 1);
    }

    #[test]
    fn test_rows_flatten_every_outcome() {
        let aggregator = ResultAggregator::new();
        aggregator.record(id(1), matched(&id(1), 2), 1).expect("record");
        aggregator
            .record(id(2), CandidateOutcome::NotFound(MeritRecord::unavailable(&id(2))), 2)
            .expect("record");
        aggregator
            .record(id(3), CandidateOutcome::Failed(FailureReason::Rejected), 6)
            .expect("record");

        let report = aggregator.finalize().expect("finalize");
        let rows = report.rows();

        assert_eq!(rows.len(), 4);
        assert_eq!(
            rows.iter().map(|row| row.outcome).collect::<Vec<_>>(),
            vec!["matched", "matched", "not_found", "failed"]
        );
        assert_eq!(rows[3].record.roll_number, "000003244");
        assert_eq!(rows[3].record.status, UNAVAILABLE);

        let summary = report.summary();
        assert_eq!(summary.candidates, 3);
        assert_eq!(summary.matched, 1);
        assert_eq!(summary.not_found, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.rows, 4);
    }

    #[tokio::test]
    async fn test_concurrent_recording() {
        let aggregator = Arc::new(ResultAggregator::new());
        let tasks: Vec<_> = (0..50u64)
            .map(|n| {
                let aggregator = aggregator.clone();
                tokio::spawn(async move {
                    aggregator.record(id(n), CandidateOutcome::Failed(FailureReason::Rejected), 1)
                })
            })
            .collect();
        for task in tasks {
            task.await.expect("task ran").expect("record");
        }

        let aggregator = Arc::try_unwrap(aggregator).expect("sole owner");
        let report = aggregator.finalize().expect("finalize");
        assert_eq!(report.entries().len(), 50);
        assert!(report
            .entries()
            .windows(2)
            .all(|pair| pair[0].candidate < pair[1].candidate));
    }
}
