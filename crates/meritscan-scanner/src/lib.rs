//! Meritscan Scanner - Candidate lookup orchestration.
//!
//! This crate turns a numeric candidate range into a complete merit report.
//! It coordinates the portal transport and the CAPTCHA solver, classifies the
//! pages the portal returns, and collects exactly one outcome per candidate.
//!
//! # Features
//!
//! - Lazy, restartable candidate generation with fixed-width identifiers
//! - Retry budget per candidate: rejected answers retry immediately, transient
//!   failures back off exponentially
//! - Per-call deadlines and cooperative cancellation
//! - Bounded worker pool, one portal session per worker
//! - CSV and JSON report export
//!
//! # Example
//!
//! ```rust,ignore
//! use meritscan_scanner::{CandidateRange, OrchestratorConfig, PipelineOrchestrator, ResultClassifier};
//! use std::sync::Arc;
//!
//! let orchestrator = PipelineOrchestrator::new(
//!     Arc::new(portal_client),
//!     solver,
//!     Arc::new(ResultClassifier::new(selectors, "meritresult.aspx")),
//!     OrchestratorConfig::from_config(&config.scanning),
//! );
//!
//! let range = CandidateRange::new("244", 100_000, 100_002)?;
//! let report = orchestrator.run(&range, CancellationToken::new()).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod aggregator;
pub mod classifier;
#[allow(missing_docs)]
pub mod error;
pub mod export;
pub mod generator;
pub mod orchestrator;
pub mod outcome;
pub mod retry;

// Re-export commonly used types
pub use aggregator::{Report, ReportEntry, ReportRow, ReportSummary, ResultAggregator};
pub use classifier::{Classification, ResultClassifier};
pub use error::{Result, ScanError};
pub use export::{write_csv, write_json, write_report};
pub use generator::{CandidateRange, DEFAULT_WIDTH};
pub use orchestrator::{OrchestratorConfig, PipelineOrchestrator};
pub use outcome::{CandidateOutcome, FailureReason, Stage};
pub use retry::RetryPolicy;
