//! Lookup portal capability and the values exchanged with it.

use crate::error::Result;
use async_trait::async_trait;
use meritscan_core::CandidateId;

/// A CAPTCHA challenge fetched for exactly one submission attempt.
///
/// Deliberately not `Clone`: [`LookupPortal::submit`] consumes it, so a
/// challenge can never be paired with a second answer.
#[derive(Debug)]
pub struct Challenge {
    /// Raw image bytes
    pub image: Vec<u8>,
    /// URL the image was fetched from
    pub image_url: String,
    /// Hidden form fields of the page that issued the challenge
    pub form_fields: Vec<(String, String)>,
}

/// Page returned by a lookup submission.
#[derive(Debug, Clone)]
pub struct SubmissionResponse {
    /// URL after following redirects
    pub final_url: String,
    /// HTTP status code of the final response
    pub status: u16,
    /// Response body
    pub body: String,
}

/// Challenge fetching and lookup submission against one portal session.
///
/// Implementations keep whatever cookies or tokens the portal needs between
/// the challenge request and the submission that answers it.
#[async_trait]
pub trait LookupPortal: Send + Sync {
    /// Fetch a fresh CAPTCHA challenge.
    ///
    /// # Errors
    /// Returns [`crate::PortalError::ChallengeUnavailable`] if the page has no
    /// CAPTCHA image or the image cannot be fetched.
    async fn fetch_challenge(&self) -> Result<Challenge>;

    /// Submit `candidate` with the CAPTCHA `answer` for `challenge`.
    ///
    /// A rejected answer is a normal response, not an error.
    ///
    /// # Errors
    /// Returns [`crate::PortalError::Submission`] on transport failure.
    async fn submit(
        &self,
        candidate: &CandidateId,
        answer: &str,
        challenge: Challenge,
    ) -> Result<SubmissionResponse>;
}

/// Opens independent portal sessions, one per worker.
pub trait PortalConnector: Send + Sync {
    /// Open a new session with its own cookie jar.
    fn connect(&self) -> Result<Box<dyn LookupPortal>>;
}
