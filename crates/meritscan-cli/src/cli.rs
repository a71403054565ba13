//! Command-line arguments and how they override the loaded configuration.

use clap::Parser;
use meritscan_core::{AppConfig, ConfigResult, OutputFormat};
use std::path::PathBuf;

/// Report format selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FormatArg {
    /// Seven-column CSV
    Csv,
    /// JSON with outcome and attempts per candidate
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "meritscan",
    version,
    about = "Look up merit list results for a range of candidate roll numbers"
)]
pub struct Cli {
    /// Suffix appended to every roll number
    #[arg(long)]
    pub suffix: String,

    /// First roll number in the range
    #[arg(long)]
    pub start: u64,

    /// Last roll number in the range (inclusive)
    #[arg(long)]
    pub end: u64,

    /// Retries per candidate after the first attempt
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,

    /// Portal requests per second across all workers (0 = unlimited)
    #[arg(long, value_name = "PER_SEC")]
    pub rate_limit: Option<f64>,

    /// Concurrent workers, each with its own portal session
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Report file
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Configuration file (defaults to the user config directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Solver endpoint URL
    #[arg(long, value_name = "URL")]
    pub solver_url: Option<String>,

    /// Keep a copy of every CAPTCHA image in DIR (defaults to the user cache
    /// directory)
    #[arg(long, value_name = "DIR", num_args = 0..=1)]
    pub archive_captchas: Option<Option<PathBuf>>,
}

impl Cli {
    /// Apply flags on top of file and environment configuration.
    pub fn apply(&self, config: &mut AppConfig) -> ConfigResult<()> {
        if let Some(max_retries) = self.max_retries {
            config.scanning.max_retries = max_retries;
        }
        if let Some(rate) = self.rate_limit {
            config.scanning.rate_limit_per_sec = (rate > 0.0).then_some(rate);
        }
        if let Some(workers) = self.workers {
            config.scanning.workers = workers;
        }
        if let Some(output) = &self.output {
            config.output.path.clone_from(output);
        }
        if let Some(format) = self.format {
            config.output.format = format.into();
        }
        if let Some(url) = &self.solver_url {
            config.solver.endpoint.clone_from(url);
        }
        match &self.archive_captchas {
            Some(Some(dir)) => config.solver.archive_dir = Some(dir.clone()),
            Some(None) => {
                config.solver.archive_dir = Some(AppConfig::cache_dir()?.join("captchas"));
            }
            None => {}
        }
        Ok(())
    }
}
