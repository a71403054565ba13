//! Shared types used across meritscan.
//!
//! This module defines the newtypes that flow through the retrieval pipeline:
//! candidate identifiers, merit records and timestamps.

use crate::error::MeritError;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

/// Marker written in place of any field the portal did not provide.
pub const UNAVAILABLE: &str = "N/A";

/// Column headers of the tabular report, in output order.
pub const REPORT_COLUMNS: [&str; 7] = [
    "Roll No",
    "Name",
    "Father Name",
    "Selection List No",
    "Programme",
    "Merit Position",
    "Status",
];

/// Identifier of a single candidate lookup.
///
/// Rendered as a zero-padded number of fixed width followed by a suffix,
/// e.g. `100001244` for number `100001`, width 6 and suffix `244`.
/// The numeric part is kept so candidates order by generation order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateId {
    number: u64,
    text: String,
}

impl CandidateId {
    /// Create a new `CandidateId`.
    ///
    /// # Errors
    /// Returns error if the suffix is not alphanumeric or the number does not
    /// fit in `width` digits.
    pub fn new(number: u64, suffix: &str, width: usize) -> Result<Self, MeritError> {
        Self::validate_suffix(suffix)?;

        let digits = number.to_string();
        if digits.len() > width {
            return Err(MeritError::Validation(format!(
                "candidate number {number} does not fit in {width} digits"
            )));
        }

        Ok(Self {
            number,
            text: format!("{digits:0>width$}{suffix}"),
        })
    }

    /// Get the numeric part of the identifier.
    #[must_use]
    pub fn number(&self) -> u64 {
        self.number
    }

    /// Get the rendered identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Validate suffix format: ASCII alphanumeric, at most 16 characters.
    fn validate_suffix(suffix: &str) -> Result<(), MeritError> {
        static SUFFIX_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex =
            SUFFIX_REGEX.get_or_init(|| Regex::new(r"^[A-Za-z0-9]{0,16}$").expect("valid regex"));

        if regex.is_match(suffix) {
            Ok(())
        } else {
            Err(MeritError::Validation(format!(
                "invalid candidate suffix: must be up to 16 alphanumeric characters, got '{suffix}'"
            )))
        }
    }
}

impl Ord for CandidateId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number
            .cmp(&other.number)
            .then_with(|| self.text.cmp(&other.text))
    }
}

impl PartialOrd for CandidateId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl Serialize for CandidateId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

/// One row of a candidate's merit result.
///
/// Every field is present; anything the portal did not provide holds
/// [`UNAVAILABLE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeritRecord {
    /// Candidate roll number (the looked-up identifier)
    pub roll_number: String,
    /// Candidate name
    pub name: String,
    /// Candidate's father's name
    pub father_name: String,
    /// Selection list number
    pub selection_list_no: String,
    /// Programme the merit position applies to
    pub programme: String,
    /// Position on the merit list
    pub merit_position: String,
    /// Admission status
    pub status: String,
}

impl MeritRecord {
    /// A record for `candidate` with every other field unavailable.
    #[must_use]
    pub fn unavailable(candidate: &CandidateId) -> Self {
        Self {
            roll_number: candidate.to_string(),
            name: UNAVAILABLE.to_string(),
            father_name: UNAVAILABLE.to_string(),
            selection_list_no: UNAVAILABLE.to_string(),
            programme: UNAVAILABLE.to_string(),
            merit_position: UNAVAILABLE.to_string(),
            status: UNAVAILABLE.to_string(),
        }
    }

    /// Field values in [`REPORT_COLUMNS`] order.
    #[must_use]
    pub fn columns(&self) -> [&str; 7] {
        [
            &self.roll_number,
            &self.name,
            &self.father_name,
            &self.selection_list_no,
            &self.programme,
            &self.merit_position,
            &self.status,
        ]
    }

    /// Whether the merit data fields (everything after the identity columns)
    /// are all unavailable.
    #[must_use]
    pub fn has_no_merit_data(&self) -> bool {
        [
            &self.selection_list_no,
            &self.programme,
            &self.merit_position,
            &self.status,
        ]
        .iter()
        .all(|field| field.as_str() == UNAVAILABLE)
    }
}

/// Wrapper around `chrono::DateTime<Utc>` for consistent timestamp handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Format as RFC3339 string.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_id_formatting() {
        let id = CandidateId::new(100_001, "244", 6).expect("valid candidate");
        assert_eq!(id.as_str(), "100001244");
        assert_eq!(id.number(), 100_001);

        let padded = CandidateId::new(42, "244", 6).expect("valid candidate");
        assert_eq!(padded.to_string(), "000042244");
    }

    #[test]
    fn test_candidate_id_rejects_overflowing_number() {
        let result = CandidateId::new(1_000_000, "244", 6);
        assert!(matches!(result, Err(MeritError::Validation(_))));
    }

    #[test]
    fn test_candidate_id_rejects_bad_suffix() {
        assert!(CandidateId::new(1, "24-4", 6).is_err());
        assert!(CandidateId::new(1, "a b", 6).is_err());
        assert!(CandidateId::new(1, "", 6).is_ok());
    }

    #[test]
    fn test_candidate_id_ordering() {
        let a = CandidateId::new(99, "244", 6).expect("valid candidate");
        let b = CandidateId::new(100, "244", 6).expect("valid candidate");
        assert!(a < b);

        let mut ids = vec![b.clone(), a.clone()];
        ids.sort();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn test_candidate_id_serializes_as_string() {
        let id = CandidateId::new(7, "X", 3).expect("valid candidate");
        let json = serde_json::to_string(&id).expect("serialize candidate");
        assert_eq!(json, "\"007X\"");
    }

    #[test]
    fn test_unavailable_record() {
        let id = CandidateId::new(100_000, "244", 6).expect("valid candidate");
        let record = MeritRecord::unavailable(&id);

        assert_eq!(record.roll_number, "100000244");
        assert!(record.has_no_merit_data());
        assert_eq!(
            &record.columns()[1..],
            &[UNAVAILABLE; 6],
            "every column but the roll number should be unavailable"
        );
    }

    #[test]
    fn test_columns_follow_report_order() {
        let record = MeritRecord {
            roll_number: "1".to_string(),
            name: "2".to_string(),
            father_name: "3".to_string(),
            selection_list_no: "4".to_string(),
            programme: "5".to_string(),
            merit_position: "6".to_string(),
            status: "7".to_string(),
        };
        assert_eq!(record.columns(), ["1", "2", "3", "4", "5", "6", "7"]);
        assert_eq!(REPORT_COLUMNS.len(), record.columns().len());
        assert!(!record.has_no_merit_data());
    }
}
