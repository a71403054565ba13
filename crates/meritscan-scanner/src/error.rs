use meritscan_core::MeritError;
use meritscan_portal::PortalError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Invalid candidate range {start}..={end}: {reason}")]
    InvalidRange { start: u64, end: u64, reason: String },

    #[error("Outcome for candidate {candidate} was already recorded")]
    DuplicateOutcome { candidate: String },

    #[error("Candidate error: {0}")]
    Candidate(#[from] MeritError),

    #[error("Portal error: {0}")]
    Portal(#[from] PortalError),

    #[error("Report I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON export error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;
