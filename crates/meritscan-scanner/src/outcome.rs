//! Terminal result of processing one candidate.

use meritscan_core::MeritRecord;
use serde::Serialize;
use std::fmt;

/// Pipeline call that exceeded its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Fetching the lookup page and CAPTCHA image
    Challenge,
    /// Waiting for the solver
    Solve,
    /// Submitting the lookup form
    Submit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Challenge => "challenge",
            Self::Solve => "solve",
            Self::Submit => "submit",
        };
        f.write_str(name)
    }
}

/// Why a candidate ended without a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// The CAPTCHA challenge could not be obtained
    ChallengeUnavailable(String),
    /// The solver produced no usable answer
    Solver(String),
    /// The lookup submission failed in transport
    Submission(String),
    /// Every answer was rejected by the portal
    Rejected,
    /// A call exceeded the per-call deadline
    Timeout(Stage),
    /// The run was cancelled before the candidate finished
    Cancelled,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChallengeUnavailable(msg) => write!(f, "challenge unavailable: {msg}"),
            Self::Solver(msg) => write!(f, "solver failed: {msg}"),
            Self::Submission(msg) => write!(f, "submission failed: {msg}"),
            Self::Rejected => f.write_str("CAPTCHA answer rejected"),
            Self::Timeout(stage) => write!(f, "{stage} timed out"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Exactly one of these is produced per candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum CandidateOutcome {
    /// Result page with one record per merit row (never empty)
    Matched(Vec<MeritRecord>),
    /// Result page without merit rows
    NotFound(MeritRecord),
    /// Retry budget exhausted or run cancelled
    Failed(FailureReason),
}

impl CandidateOutcome {
    /// Short tag used in logs and exported rows.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Matched(_) => "matched",
            Self::NotFound(_) => "not_found",
            Self::Failed(_) => "failed",
        }
    }

    /// Whether the candidate ended without a result page.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}
