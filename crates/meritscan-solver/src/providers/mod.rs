//! Solver implementations and wrappers.

pub mod archive;
pub mod http;
pub mod limited;

pub use archive::ArchivingSolver;
pub use http::HttpSolver;
pub use limited::LimitedSolver;

use crate::error::Result;
use crate::solver::CaptchaSolver;
use meritscan_core::SolverConfig;
use std::sync::Arc;

/// Build the configured solver stack.
///
/// The HTTP solver is wrapped in an [`ArchivingSolver`] when an archive
/// directory is configured, and always in a [`LimitedSolver`].
pub fn build_solver(config: &SolverConfig) -> Result<Arc<dyn CaptchaSolver>> {
    let mut solver: Arc<dyn CaptchaSolver> = Arc::new(HttpSolver::from_config(config)?);

    if let Some(dir) = &config.archive_dir {
        solver = Arc::new(ArchivingSolver::new(solver, dir)?);
        tracing::info!(dir = %dir.display(), "Archiving CAPTCHA images");
    }

    Ok(Arc::new(LimitedSolver::new(solver, config.max_concurrent)))
}
