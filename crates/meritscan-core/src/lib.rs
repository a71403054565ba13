//! Meritscan Core - Foundation crate for the merit list retrieval pipeline.
//!
//! This crate provides the shared types, error handling and configuration
//! management that the portal, solver and scanner crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - Shared newtypes (`CandidateId`, `MeritRecord`, `Timestamp`)
//!
//! # Example
//!
//! ```rust
//! use meritscan_core::{AppConfig, CandidateId, MeritRecord, UNAVAILABLE};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! config.validate()?;
//!
//! let candidate = CandidateId::new(100_001, "244", 6)?;
//! assert_eq!(candidate.as_str(), "100001244");
//!
//! let record = MeritRecord::unavailable(&candidate);
//! assert_eq!(record.status, UNAVAILABLE);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, OutputConfig, OutputFormat, PortalConfig, ScanningConfig, SelectorConfig,
    SolverConfig, SolverResponseFormat, MIN_RATE_PER_SEC,
};
pub use error::{ConfigError, ConfigResult, MeritError, Result};
pub use types::{CandidateId, MeritRecord, Timestamp, REPORT_COLUMNS, UNAVAILABLE};
