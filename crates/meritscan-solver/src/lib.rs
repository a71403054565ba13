//! Meritscan Solver - CAPTCHA recognition behind a single-method capability.
//!
//! The pipeline only ever sees [`CaptchaSolver`]: image bytes in, best-guess
//! text out. Wrong answers are expected; the scanner's retry policy absorbs
//! them. Any implementation is substitutable: a remote model, a human in the
//! loop, or a deterministic double in tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use meritscan_solver::{build_solver, SolvedText};
//!
//! let solver = build_solver(&config.solver)?;
//! let raw = solver.solve(&challenge.image).await?;
//! let answer = SolvedText::normalize(&raw)?;
//! ```
//!
//! Providers compose as wrappers:
//!
//! ```text
//! LimitedSolver (semaphore) → ArchivingSolver (optional) → HttpSolver
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod providers;
pub mod solver;

// Re-export commonly used types
pub use error::{Result, SolverError};
pub use providers::{build_solver, ArchivingSolver, HttpSolver, LimitedSolver};
pub use solver::{CaptchaSolver, SolvedText};
