//! Portal transport for merit lookups.
//!
//! Each [`PortalSession`] owns its own HTTP client and cookie jar so CAPTCHA
//! challenges are never shared between workers. All sessions opened from one
//! [`PortalClient`] draw from the same [`RateLimiter`].
//!
//! ```rust,ignore
//! use meritscan_portal::{LookupPortal, PortalClient, RateLimiter};
//!
//! let client = PortalClient::new(&config.portal, &config.selectors, RateLimiter::new(Some(2.0)))?;
//! let session = client.open_session()?;
//!
//! let challenge = session.fetch_challenge().await?;
//! let response = session.submit(&candidate, "X7KQ", challenge).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod client;
pub mod document;
#[allow(missing_docs)]
pub mod error;
pub mod portal;
pub mod rate_limit;

pub use client::{PortalClient, PortalSession};
pub use document::{PageDocument, PageSelectors};
pub use error::{PortalError, Result};
pub use portal::{Challenge, LookupPortal, PortalConnector, SubmissionResponse};
pub use rate_limit::RateLimiter;
