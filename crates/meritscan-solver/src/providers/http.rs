//! Remote recognition service reached over HTTP.

use crate::error::{Result, SolverError};
use crate::solver::CaptchaSolver;
use async_trait::async_trait;
use meritscan_core::{SolverConfig, SolverResponseFormat};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

const SOLVER_ID: &str = "http";

/// Solver that POSTs the raw image to a recognition endpoint.
///
/// The endpoint receives the image bytes as `application/octet-stream` and
/// answers either with the text itself or with a JSON object carrying it in
/// `text`, `prediction` or `data[0]`.
pub struct HttpSolver {
    client: Client,
    endpoint: String,
    format: SolverResponseFormat,
}

impl HttpSolver {
    /// Create a solver for `endpoint`.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(
        endpoint: impl Into<String>,
        format: SolverResponseFormat,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SolverError::Internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            format,
        })
    }

    /// Create a solver from configuration.
    pub fn from_config(config: &SolverConfig) -> Result<Self> {
        Self::new(
            config.endpoint.clone(),
            config.response_format,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn extract_answer(&self, body: &str) -> Result<String> {
        match self.format {
            SolverResponseFormat::Plain => Ok(body.trim().to_string()),
            SolverResponseFormat::Json => {
                let value: Value = serde_json::from_str(body).map_err(|e| SolverError::Parse {
                    solver: SOLVER_ID.to_string(),
                    message: format!("invalid JSON: {e}"),
                })?;
                answer_from_json(&value).ok_or_else(|| SolverError::Parse {
                    solver: SOLVER_ID.to_string(),
                    message: "no answer field in response".to_string(),
                })
            }
        }
    }
}

fn answer_from_json(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => ["text", "prediction"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .or_else(|| {
                map.get("data")
                    .and_then(Value::as_array)
                    .and_then(|data| data.first())
                    .and_then(Value::as_str)
            })
            .map(ToString::to_string),
        _ => None,
    }
}

#[async_trait]
impl CaptchaSolver for HttpSolver {
    async fn solve(&self, image: &[u8]) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => SolverError::RateLimited {
                    solver: SOLVER_ID.to_string(),
                    message,
                },
                StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                    SolverError::Unavailable {
                        solver: SOLVER_ID.to_string(),
                        message,
                    }
                }
                _ => SolverError::Api {
                    solver: SOLVER_ID.to_string(),
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let body = response.text().await?;
        self.extract_answer(&body)
    }

    fn solver_id(&self) -> &str {
        SOLVER_ID
    }
}
