use anyhow::{Context, Result};
use clap::Parser;
use fragviz::{
    cli::Cli,
    config::VisualizerConfig,
    dashboard::DashboardRenderer,
    driver::{self, RunOptions},
    progress::ConsoleSink,
};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Progress lines already go to stdout; keep their tracing mirror quiet
const DEFAULT_DEBUG_FILTER: &str = "debug,fragviz::progress=info";

/// Initialize tracing subscriber for debug output
///
/// `RUST_LOG` replaces the default filter when set.
fn init_tracing(debug: bool) {
    if debug {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DEBUG_FILTER));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<ExitCode> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = VisualizerConfig::load(args.config.as_deref()).context("loading configuration")?;
    let options = RunOptions::from_cli(&args, &config);
    tracing::debug!(?options, "resolved run options");

    let outcome = driver::run(&options, &mut ConsoleSink, &mut DashboardRenderer::new());
    Ok(outcome.into())
}
