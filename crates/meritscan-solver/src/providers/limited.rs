//! Concurrency cap for a shared solver.

use crate::error::{Result, SolverError};
use crate::solver::CaptchaSolver;
use async_trait::async_trait;
use meritscan_core::CandidateId;
use std::sync::Arc;
use tokio::sync::{Semaphore, SemaphorePermit};

/// Allows at most `max_concurrent` in-flight calls to the wrapped solver.
///
/// Independent of the portal rate limit: the recognition service has its own
/// capacity.
pub struct LimitedSolver {
    inner: Arc<dyn CaptchaSolver>,
    permits: Semaphore,
}

impl LimitedSolver {
    /// Wrap `inner`, clamping `max_concurrent` to at least one.
    #[must_use]
    pub fn new(inner: Arc<dyn CaptchaSolver>, max_concurrent: usize) -> Self {
        Self {
            inner,
            permits: Semaphore::new(max_concurrent.max(1)),
        }
    }

    async fn permit(&self) -> Result<SemaphorePermit<'_>> {
        self.permits
            .acquire()
            .await
            .map_err(|_| SolverError::Internal("solver permits closed".to_string()))
    }

    /// Number of calls that could start right now.
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }
}

#[async_trait]
impl CaptchaSolver for LimitedSolver {
    async fn solve(&self, image: &[u8]) -> Result<String> {
        let _permit = self.permit().await?;
        self.inner.solve(image).await
    }

    async fn solve_for(&self, candidate: &CandidateId, image: &[u8]) -> Result<String> {
        let _permit = self.permit().await?;
        self.inner.solve_for(candidate, image).await
    }

    fn solver_id(&self) -> &str {
        self.inner.solver_id()
    }
}
