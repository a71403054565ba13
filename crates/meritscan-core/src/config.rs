//! Configuration management for meritscan.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. Defaults target the NUST undergraduate
//! admissions merit search portal.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Slowest accepted portal rate: one request every 1000 seconds.
pub const MIN_RATE_PER_SEC: f64 = 0.001;

/// Main application configuration.
///
/// This is loaded from `~/.config/meritscan/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Portal endpoints and transport settings
    pub portal: PortalConfig,
    /// Selectors and form field names used on portal pages
    pub selectors: SelectorConfig,
    /// External CAPTCHA solver settings
    pub solver: SolverConfig,
    /// Retry, concurrency and rate limit settings
    pub scanning: ScanningConfig,
    /// Report output settings
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load configuration from the default location, falling back to defaults
    /// if the file does not exist.
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `MERITSCAN_BASE_URL`: Override the portal base URL
    /// - `MERITSCAN_SOLVER_URL`: Override the solver endpoint
    /// - `MERITSCAN_MAX_RETRIES`: Override the per-candidate retry budget
    /// - `MERITSCAN_RATE_LIMIT`: Override requests per second (0 = unlimited)
    /// - `MERITSCAN_WORKERS`: Override the worker count
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("MERITSCAN_BASE_URL") {
            tracing::debug!("Override portal.base_url from env: {}", val);
            self.portal.base_url = val;
        }

        if let Ok(val) = std::env::var("MERITSCAN_SOLVER_URL") {
            tracing::debug!("Override solver.endpoint from env: {}", val);
            self.solver.endpoint = val;
        }

        if let Ok(val) = std::env::var("MERITSCAN_MAX_RETRIES") {
            if let Ok(retries) = val.parse() {
                self.scanning.max_retries = retries;
                tracing::debug!("Override scanning.max_retries from env: {}", retries);
            }
        }

        if let Ok(val) = std::env::var("MERITSCAN_RATE_LIMIT") {
            if let Ok(rate) = val.parse::<f64>() {
                self.scanning.rate_limit_per_sec = (rate > 0.0).then_some(rate);
                tracing::debug!("Override scanning.rate_limit_per_sec from env: {}", rate);
            }
        }

        if let Ok(val) = std::env::var("MERITSCAN_WORKERS") {
            if let Ok(workers) = val.parse() {
                self.scanning.workers = workers;
                tracing::debug!("Override scanning.workers from env: {}", workers);
            }
        }

        self
    }

    /// Load from `path` (or the default location) and apply env overrides.
    pub fn load_with_env(path: Option<&Path>) -> ConfigResult<Self> {
        let config = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };
        Ok(config.with_env_overrides())
    }

    /// Check values that would otherwise only fail mid-run.
    ///
    /// Selector syntax and URL syntax are checked by the crates that compile
    /// them; this covers numeric bounds and required strings.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.portal.base_url.trim().is_empty() {
            return Err(ConfigError::invalid("portal.base_url", "must not be empty"));
        }
        if self.portal.result_page_pattern.trim().is_empty() {
            return Err(ConfigError::invalid(
                "portal.result_page_pattern",
                "must not be empty",
            ));
        }
        if self.portal.request_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "portal.request_timeout_secs",
                "must be greater than zero",
            ));
        }
        if self.selectors.roll_number_field.is_empty() || self.selectors.captcha_field.is_empty()
        {
            return Err(ConfigError::invalid(
                "selectors",
                "form field names must not be empty",
            ));
        }
        if self.solver.max_concurrent == 0 {
            return Err(ConfigError::invalid(
                "solver.max_concurrent",
                "must be at least 1",
            ));
        }
        if self.scanning.workers == 0 {
            return Err(ConfigError::invalid("scanning.workers", "must be at least 1"));
        }
        if self.scanning.call_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "scanning.call_timeout_secs",
                "must be greater than zero",
            ));
        }
        if self.scanning.candidate_width == 0 || self.scanning.candidate_width > 19 {
            return Err(ConfigError::invalid(
                "scanning.candidate_width",
                "must be between 1 and 19",
            ));
        }
        if let Some(rate) = self.scanning.rate_limit_per_sec {
            if !rate.is_finite() || rate < MIN_RATE_PER_SEC {
                return Err(ConfigError::invalid(
                    "scanning.rate_limit_per_sec",
                    format!("must be at least {MIN_RATE_PER_SEC} requests per second"),
                ));
            }
        }
        if self.scanning.backoff_multiplier < 1.0 {
            return Err(ConfigError::invalid(
                "scanning.backoff_multiplier",
                "must be at least 1.0",
            ));
        }
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/meritscan/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "meritscan", "meritscan").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the cache directory path, used for archived CAPTCHA images.
    ///
    /// Uses XDG base directories: `~/.cache/meritscan`
    pub fn cache_dir() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "meritscan", "meritscan").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.cache_dir().to_path_buf())
    }
}

/// Portal endpoints and transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Portal origin, e.g. `https://ugadmissions.nust.edu.pk`
    pub base_url: String,
    /// Path of the search page (GET for the challenge, POST for lookups)
    pub search_path: String,
    /// Substring of the final URL that identifies a result page
    pub result_page_pattern: String,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ugadmissions.nust.edu.pk".to_string(),
            search_path: "/result/meritsearch.aspx".to_string(),
            result_page_pattern: "meritresult.aspx".to_string(),
            request_timeout_secs: 30,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

/// CSS selectors and form field names used on portal pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// CAPTCHA image element on the search page
    pub captcha_image: String,
    /// Hidden form inputs carried from the search page into the submission
    pub hidden_inputs: String,
    /// Form field carrying the candidate identifier
    pub roll_number_field: String,
    /// Form field carrying the CAPTCHA answer
    pub captcha_field: String,
    /// Roll number label on the result page
    pub roll_number: String,
    /// Candidate name label on the result page
    pub name: String,
    /// Father's name label on the result page
    pub father_name: String,
    /// Rows of the merit table on the result page (first row is the header)
    pub merit_rows: String,
    /// Cells within a merit row
    pub merit_cells: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            captcha_image: "img#ctl00_ctl00_ctl00_Body_Body_cpResultBody_RadCaptcha1_CaptchaImage"
                .to_string(),
            hidden_inputs: "input[type=hidden]".to_string(),
            roll_number_field: "Body_Body_cpResultBody_txtRollNo".to_string(),
            captcha_field: "ctl00_ctl00_ctl00_Body_Body_cpResultBody_RadCaptcha1_CaptchaTextBox"
                .to_string(),
            roll_number: "span#Body_Body_lblRollNo".to_string(),
            name: "span#Body_Body_lblName".to_string(),
            father_name: "span#Body_Body_lblFatherName".to_string(),
            merit_rows: "div#Body_Body_divBBAMerit table tr".to_string(),
            merit_cells: "td".to_string(),
        }
    }
}

/// How the solver service encodes its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverResponseFormat {
    /// The response body is the answer
    Plain,
    /// The response body is JSON (`text`, `prediction` or `data[0]`)
    Json,
}

/// External CAPTCHA solver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Endpoint that accepts raw image bytes and returns the recognized text
    pub endpoint: String,
    /// Response encoding of the endpoint
    pub response_format: SolverResponseFormat,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum concurrent solver calls
    pub max_concurrent: usize,
    /// Directory to archive challenge images into (disabled if unset)
    pub archive_dir: Option<PathBuf>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:7860/predict".to_string(),
            response_format: SolverResponseFormat::Json,
            timeout_secs: 30,
            max_concurrent: 2,
            archive_dir: None,
        }
    }
}

/// Retry, concurrency and rate limit settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanningConfig {
    /// Retry budget per candidate (attempts = `max_retries` + 1)
    pub max_retries: u32,
    /// Number of workers, each with its own portal session
    pub workers: usize,
    /// Global portal request ceiling per second (unset = unlimited)
    pub rate_limit_per_sec: Option<f64>,
    /// Timeout for each network or solver call in seconds
    pub call_timeout_secs: u64,
    /// Initial backoff after a transient failure in milliseconds
    pub backoff_initial_ms: u64,
    /// Maximum backoff in milliseconds
    pub backoff_max_ms: u64,
    /// Multiplier applied to the backoff after each transient failure
    pub backoff_multiplier: f64,
    /// Add random jitter to backoff delays
    pub jitter: bool,
    /// Digits of the zero-padded numeric part of a candidate identifier
    pub candidate_width: usize,
}

impl Default for ScanningConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            workers: 1,
            rate_limit_per_sec: Some(2.0),
            call_timeout_secs: 45,
            backoff_initial_ms: 1000,
            backoff_max_ms: 10_000,
            backoff_multiplier: 2.0,
            jitter: true,
            candidate_width: 6,
        }
    }
}

/// Report file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Comma-separated rows with the fixed report columns
    #[default]
    Csv,
    /// JSON document with one entry per candidate
    Json,
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output file path
    pub path: PathBuf,
    /// Output format
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("merit_list.csv"),
            format: OutputFormat::Csv,
        }
    }
}
