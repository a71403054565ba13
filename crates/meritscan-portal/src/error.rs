use thiserror::Error;

pub type Result<T> = std::result::Result<T, PortalError>;

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("CAPTCHA challenge unavailable: {reason}")]
    ChallengeUnavailable { reason: String },

    #[error("lookup submission failed for {candidate}: {reason}")]
    Submission { candidate: String, reason: String },

    #[error("invalid portal URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid selector for {field}: {reason}")]
    InvalidSelector { field: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl PortalError {
    pub(crate) fn challenge(reason: impl Into<String>) -> Self {
        Self::ChallengeUnavailable {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PortalError::challenge("image element missing");
        assert_eq!(
            err.to_string(),
            "CAPTCHA challenge unavailable: image element missing"
        );
    }

    #[test]
    fn test_submission_display_names_candidate() {
        let err = PortalError::Submission {
            candidate: "100000244".to_string(),
            reason: "connection reset".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "lookup submission failed for 100000244: connection reset"
        );
    }
}
