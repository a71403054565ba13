//! Core solver trait and the normalized answer type.

use crate::error::{Result, SolverError};
use async_trait::async_trait;
use meritscan_core::CandidateId;
use std::fmt;

/// Capability that turns a CAPTCHA image into a best-guess text.
///
/// Implementations must be thread-safe (Send + Sync); one solver is shared by
/// every worker of a run.
#[async_trait]
pub trait CaptchaSolver: Send + Sync {
    /// Recognize the text in `image`.
    ///
    /// # Errors
    /// Returns error if the solver cannot produce an answer at all. A wrong
    /// answer is not an error.
    async fn solve(&self, image: &[u8]) -> Result<String>;

    /// Recognize a challenge fetched for `candidate`.
    ///
    /// Wrappers that keep per-candidate state override this; everything else
    /// answers exactly as [`CaptchaSolver::solve`].
    async fn solve_for(&self, _candidate: &CandidateId, image: &[u8]) -> Result<String> {
        self.solve(image).await
    }

    /// Get the unique identifier for this solver.
    fn solver_id(&self) -> &str;
}

/// A normalized CAPTCHA answer: whitespace removed, upper-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolvedText(String);

impl SolvedText {
    /// Normalize a raw solver answer.
    ///
    /// # Errors
    /// Returns [`SolverError::EmptyAnswer`] if nothing remains after
    /// normalization.
    pub fn normalize(raw: &str) -> Result<Self> {
        let text: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_uppercase)
            .collect();

        if text.is_empty() {
            return Err(SolverError::EmptyAnswer);
        }
        Ok(Self(text))
    }

    /// Get the answer text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SolvedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_uppercases_and_trims() {
        let text = SolvedText::normalize("  x7kq\n").expect("non-empty answer");
        assert_eq!(text.as_str(), "X7KQ");

        let spaced = SolvedText::normalize("a b c").expect("non-empty answer");
        assert_eq!(spaced.to_string(), "ABC");
    }

    struct FixedSolver;

    #[async_trait]
    impl CaptchaSolver for FixedSolver {
        async fn solve(&self, _image: &[u8]) -> Result<String> {
            Ok("abcd".to_string())
        }

        fn solver_id(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_solve_for_defaults_to_solve() {
        let candidate = CandidateId::new(100_001, "244", 6).expect("valid candidate");
        let answer = FixedSolver
            .solve_for(&candidate, b"img")
            .await
            .expect("solve");
        assert_eq!(answer, "abcd");
    }

    #[test]
    fn test_normalize_rejects_blank() {
        assert!(matches!(
            SolvedText::normalize(" \t "),
            Err(SolverError::EmptyAnswer)
        ));
        assert!(matches!(
            SolvedText::normalize(""),
            Err(SolverError::EmptyAnswer)
        ));
    }
}
