//! Error types for the solver subsystem.

use thiserror::Error;

/// Errors that can occur while resolving a CAPTCHA.
#[derive(Error, Debug)]
pub enum SolverError {
    /// Solver service is down or overloaded
    #[error("solver unavailable ({solver}): {message}")]
    Unavailable {
        /// Solver identifier
        solver: String,
        /// Error message
        message: String,
    },

    /// Rate limit exceeded on the solver service
    #[error("rate limit exceeded for {solver}: {message}")]
    RateLimited {
        /// Solver identifier
        solver: String,
        /// Error message
        message: String,
    },

    /// API error with status code
    #[error("API error ({solver}): status {status}, {message}")]
    Api {
        /// Solver identifier
        solver: String,
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Response parsing error
    #[error("failed to parse response from {solver}: {message}")]
    Parse {
        /// Solver identifier
        solver: String,
        /// Error message
        message: String,
    },

    /// The solver answered with nothing usable
    #[error("solver returned an empty answer")]
    EmptyAnswer,

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for solver operations.
pub type Result<T> = std::result::Result<T, SolverError>;
