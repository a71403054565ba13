//! Meritscan command-line shell
//!
//! Thin entry point: parses arguments, loads configuration, wires the portal,
//! solver and scanner crates together and writes the report.

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use meritscan_core::AppConfig;
use meritscan_portal::{PortalClient, RateLimiter};
use meritscan_scanner::{
    write_report, CandidateRange, OrchestratorConfig, PipelineOrchestrator, ResultClassifier,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Initialize tracing subscriber for logging
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,meritscan=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    info!("Starting meritscan v{}", env!("CARGO_PKG_VERSION"));

    let mut config =
        AppConfig::load_with_env(cli.config.as_deref()).context("failed to load configuration")?;
    cli.apply(&mut config)
        .context("failed to apply command-line flags")?;
    config.validate().context("invalid configuration")?;

    let range = CandidateRange::with_width(
        cli.suffix.as_str(),
        cli.start,
        cli.end,
        config.scanning.candidate_width,
    )
    .context("invalid candidate range")?;

    let limiter = RateLimiter::new(config.scanning.rate_limit_per_sec);
    let client = PortalClient::new(&config.portal, &config.selectors, limiter)
        .context("invalid portal configuration")?;
    let classifier = ResultClassifier::new(
        client.selectors().clone(),
        &config.portal.result_page_pattern,
    );
    let solver = meritscan_solver::build_solver(&config.solver)
        .context("failed to set up CAPTCHA solver")?;

    info!(
        portal = %client.search_url(),
        solver = %config.solver.endpoint,
        suffix = range.suffix(),
        candidates = range.len(),
        "Configured lookup run"
    );

    let orchestrator = PipelineOrchestrator::new(
        Arc::new(client),
        solver,
        Arc::new(classifier),
        OrchestratorConfig::from_config(&config.scanning),
    );

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing with the candidates processed so far");
            ctrl_c.cancel();
        }
    });

    let report = orchestrator
        .run(&range, cancel)
        .await
        .context("lookup run failed")?;

    write_report(&report, &config.output.path, config.output.format)
        .with_context(|| format!("failed to write {}", config.output.path.display()))?;

    let summary = report.summary();
    info!(
        matched = summary.matched,
        not_found = summary.not_found,
        failed = summary.failed,
        rows = summary.rows,
        output = %config.output.path.display(),
        "Done"
    );

    Ok(())
}
