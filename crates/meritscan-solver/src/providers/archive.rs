//! Keeps a copy of every challenge image handed to the solver.

use crate::error::Result;
use crate::solver::CaptchaSolver;
use async_trait::async_trait;
use meritscan_core::CandidateId;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Writes each image to `dir` before delegating.
///
/// Images solved for a candidate are named `captcha_<candidate>_<n>.png`,
/// anonymous ones `captcha_<n>.png`, where `n` counts every archived image.
/// A failed write is logged and does not fail the solve.
pub struct ArchivingSolver {
    inner: Arc<dyn CaptchaSolver>,
    dir: PathBuf,
    counter: AtomicU64,
}

impl ArchivingSolver {
    /// Wrap `inner`, creating `dir` if needed.
    pub fn new(inner: Arc<dyn CaptchaSolver>, dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            inner,
            dir,
            counter: AtomicU64::new(0),
        })
    }

    /// Directory images are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn archive(&self, candidate: Option<&CandidateId>, image: &[u8]) -> PathBuf {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let name = match candidate {
            Some(candidate) => format!("captcha_{candidate}_{n:06}.png"),
            None => format!("captcha_{n:06}.png"),
        };
        let path = self.dir.join(name);
        if let Err(e) = tokio::fs::write(&path, image).await {
            tracing::warn!(path = %path.display(), error = %e, "Failed to archive CAPTCHA image");
        }
        path
    }
}

#[async_trait]
impl CaptchaSolver for ArchivingSolver {
    async fn solve(&self, image: &[u8]) -> Result<String> {
        let path = self.archive(None, image).await;
        let answer = self.inner.solve(image).await?;
        tracing::debug!(path = %path.display(), answer = %answer, "Archived CAPTCHA image");
        Ok(answer)
    }

    async fn solve_for(&self, candidate: &CandidateId, image: &[u8]) -> Result<String> {
        let path = self.archive(Some(candidate), image).await;
        let answer = self.inner.solve_for(candidate, image).await?;
        tracing::debug!(
            candidate = %candidate,
            path = %path.display(),
            answer = %answer,
            "Archived CAPTCHA image"
        );
        Ok(answer)
    }

    fn solver_id(&self) -> &str {
        self.inner.solver_id()
    }
}
