//! Ordered candidate identifiers for one run.

use crate::error::{Result, ScanError};
use meritscan_core::CandidateId;

/// Default number of digits in the numeric part of a candidate id.
pub const DEFAULT_WIDTH: usize = 6;

/// An inclusive numeric range combined with a fixed suffix.
///
/// Iteration is lazy and restartable: every call to [`CandidateRange::iter`]
/// starts again from `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRange {
    suffix: String,
    start: u64,
    end: u64,
    width: usize,
}

impl CandidateRange {
    /// Create a range of `start..=end` with `suffix`, using [`DEFAULT_WIDTH`].
    ///
    /// # Errors
    /// Returns [`ScanError::InvalidRange`] if `start > end` or `end` is wider
    /// than the default width, and [`ScanError::Candidate`] if the suffix is
    /// not alphanumeric.
    pub fn new(suffix: impl Into<String>, start: u64, end: u64) -> Result<Self> {
        Self::with_width(suffix, start, end, DEFAULT_WIDTH)
    }

    /// Create a range whose numeric part is zero-padded to `width` digits.
    ///
    /// # Errors
    /// Same as [`CandidateRange::new`], checked against `width`.
    pub fn with_width(
        suffix: impl Into<String>,
        start: u64,
        end: u64,
        width: usize,
    ) -> Result<Self> {
        let suffix = suffix.into();
        if start > end {
            return Err(ScanError::InvalidRange {
                start,
                end,
                reason: "start is greater than end".to_string(),
            });
        }
        if end.to_string().len() > width {
            return Err(ScanError::InvalidRange {
                start,
                end,
                reason: format!("{end} does not fit in {width} digits"),
            });
        }

        // Checks the suffix once so iteration cannot fail
        CandidateId::new(start, &suffix, width)?;

        Ok(Self {
            suffix,
            start,
            end,
            width,
        })
    }

    /// Candidates in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = CandidateId> + '_ {
        (self.start..=self.end)
            .filter_map(move |number| CandidateId::new(number, &self.suffix, self.width).ok())
    }

    /// Number of candidates in the range.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Always false: a range holds at least one candidate.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Suffix appended to every candidate.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// First number in the range.
    #[must_use]
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Last number in the range.
    #[must_use]
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Zero-padding width of the numeric part.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }
}
