//! HTTP implementation of the lookup portal.

use crate::document::{PageDocument, PageSelectors};
use crate::error::{PortalError, Result};
use crate::portal::{Challenge, LookupPortal, PortalConnector, SubmissionResponse};
use crate::rate_limit::RateLimiter;
use async_trait::async_trait;
use meritscan_core::{CandidateId, PortalConfig, SelectorConfig};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Portal endpoint description shared by every session of a run.
#[derive(Debug, Clone)]
pub struct PortalClient {
    search_url: Url,
    selectors: Arc<PageSelectors>,
    roll_number_field: String,
    captcha_field: String,
    limiter: RateLimiter,
    timeout: Duration,
    user_agent: String,
}

impl PortalClient {
    /// Create a portal client from configuration.
    ///
    /// # Errors
    /// Returns error if the base URL or search path do not form a valid URL,
    /// or a selector does not compile.
    pub fn new(
        portal: &PortalConfig,
        selectors: &SelectorConfig,
        limiter: RateLimiter,
    ) -> Result<Self> {
        let base = Url::parse(&portal.base_url).map_err(|e| PortalError::InvalidUrl {
            url: portal.base_url.clone(),
            reason: e.to_string(),
        })?;
        let search_url = base
            .join(&portal.search_path)
            .map_err(|e| PortalError::InvalidUrl {
                url: portal.search_path.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            search_url,
            selectors: Arc::new(PageSelectors::from_config(selectors)?),
            roll_number_field: selectors.roll_number_field.clone(),
            captcha_field: selectors.captcha_field.clone(),
            limiter,
            timeout: Duration::from_secs(portal.request_timeout_secs),
            user_agent: portal.user_agent.clone(),
        })
    }

    /// Fully resolved search page URL.
    #[must_use]
    pub fn search_url(&self) -> &Url {
        &self.search_url
    }

    /// Compiled page selectors.
    #[must_use]
    pub fn selectors(&self) -> &Arc<PageSelectors> {
        &self.selectors
    }

    /// Open a session with its own HTTP client and cookie jar.
    pub fn open_session(&self) -> Result<PortalSession> {
        let http = Client::builder()
            .cookie_store(true)
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| PortalError::Client(e.to_string()))?;

        Ok(PortalSession {
            http,
            portal: self.clone(),
        })
    }
}

impl PortalConnector for PortalClient {
    fn connect(&self) -> Result<Box<dyn LookupPortal>> {
        Ok(Box::new(self.open_session()?))
    }
}

/// One cookie-carrying conversation with the portal.
pub struct PortalSession {
    http: Client,
    portal: PortalClient,
}

impl PortalSession {
    /// Locate the CAPTCHA image and hidden fields on the search page.
    fn read_search_page(&self, page_url: &Url, body: &str) -> Result<(Url, Vec<(String, String)>)> {
        let document = PageDocument::parse(body);
        let selectors = &self.portal.selectors;

        let src = document
            .attr(&selectors.captcha_image, "src")
            .ok_or_else(|| PortalError::challenge("CAPTCHA image not found on lookup page"))?;
        let image_url = page_url.join(&src).map_err(|e| {
            PortalError::challenge(format!("invalid CAPTCHA image src '{src}': {e}"))
        })?;

        Ok((image_url, document.form_fields(&selectors.hidden_inputs)))
    }
}

#[async_trait]
impl LookupPortal for PortalSession {
    async fn fetch_challenge(&self) -> Result<Challenge> {
        self.portal.limiter.acquire().await;
        let response = self
            .http
            .get(self.portal.search_url.clone())
            .send()
            .await
            .map_err(|e| PortalError::challenge(format!("lookup page request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortalError::challenge(format!(
                "lookup page returned HTTP {status}"
            )));
        }

        let page_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| PortalError::challenge(format!("lookup page body unreadable: {e}")))?;

        let (image_url, form_fields) = self.read_search_page(&page_url, &body)?;
        tracing::debug!(
            image_url = %image_url,
            hidden_fields = form_fields.len(),
            "Located CAPTCHA challenge"
        );

        self.portal.limiter.acquire().await;
        let response = self
            .http
            .get(image_url.clone())
            .send()
            .await
            .map_err(|e| PortalError::challenge(format!("CAPTCHA image request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortalError::challenge(format!(
                "CAPTCHA image returned HTTP {status}"
            )));
        }

        let image = response
            .bytes()
            .await
            .map_err(|e| PortalError::challenge(format!("CAPTCHA image body unreadable: {e}")))?;
        if image.is_empty() {
            return Err(PortalError::challenge("CAPTCHA image is empty"));
        }

        Ok(Challenge {
            image: image.to_vec(),
            image_url: image_url.to_string(),
            form_fields,
        })
    }

    async fn submit(
        &self,
        candidate: &CandidateId,
        answer: &str,
        challenge: Challenge,
    ) -> Result<SubmissionResponse> {
        let submission_error = |reason: String| PortalError::Submission {
            candidate: candidate.to_string(),
            reason,
        };

        let roll_field = &self.portal.roll_number_field;
        let captcha_field = &self.portal.captcha_field;
        let mut form: Vec<(String, String)> = challenge
            .form_fields
            .into_iter()
            .filter(|(name, _)| name != roll_field && name != captcha_field)
            .collect();
        form.push((roll_field.clone(), candidate.to_string()));
        form.push((captcha_field.clone(), answer.to_string()));

        self.portal.limiter.acquire().await;
        let response = self
            .http
            .post(self.portal.search_url.clone())
            .form(&form)
            .send()
            .await
            .map_err(|e| submission_error(format!("request failed: {e}")))?;

        let status = response.status();
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(submission_error(format!("portal returned HTTP {status}")));
        }

        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| submission_error(format!("response body unreadable: {e}")))?;

        Ok(SubmissionResponse {
            final_url,
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(base_url: &str) -> PortalConfig {
        PortalConfig {
            base_url: base_url.to_string(),
            ..PortalConfig::default()
        }
    }

    #[test]
    fn test_search_url_resolution() {
        let client = PortalClient::new(
            &test_config("https://ugadmissions.nust.edu.pk"),
            &SelectorConfig::default(),
            RateLimiter::unlimited(),
        )
        .expect("valid client");

        assert_eq!(
            client.search_url().as_str(),
            "https://ugadmissions.nust.edu.pk/result/meritsearch.aspx"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = PortalClient::new(
            &test_config("not a url"),
            &SelectorConfig::default(),
            RateLimiter::unlimited(),
        );
        assert!(matches!(result, Err(PortalError::InvalidUrl { .. })));
    }

    #[test]
    fn test_relative_image_src_resolves_against_origin() {
        let client = PortalClient::new(
            &test_config("https://ugadmissions.nust.edu.pk"),
            &SelectorConfig::default(),
            RateLimiter::unlimited(),
        )
        .expect("valid client");
        let session = client.open_session().expect("open session");

        let body = r#"<img id="ctl00_ctl00_ctl00_Body_Body_cpResultBody_RadCaptcha1_CaptchaImage"
                          src="../Telerik.Web.UI.WebResource.axd?type=rca" />"#;
        let (image_url, fields) = session
            .read_search_page(client.search_url(), body)
            .expect("challenge located");

        assert_eq!(
            image_url.as_str(),
            "https://ugadmissions.nust.edu.pk/Telerik.Web.UI.WebResource.axd?type=rca"
        );
        assert!(fields.is_empty());
    }

    #[test]
    fn test_missing_image_is_challenge_unavailable() {
        let client = PortalClient::new(
            &test_config("https://ugadmissions.nust.edu.pk"),
            &SelectorConfig::default(),
            RateLimiter::unlimited(),
        )
        .expect("valid client");
        let session = client.open_session().expect("open session");

        let result = session.read_search_page(client.search_url(), "<html></html>");
        assert!(matches!(
            result,
            Err(PortalError::ChallengeUnavailable { .. })
        ));
    }
}
