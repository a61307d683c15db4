//! CLI argument parsing for fragviz

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the rendered report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// HTML dashboard with embedded SVG charts (default)
    Html,
    /// JSON summary of statistics and sampling
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "fragviz")]
#[command(version)]
#[command(about = "Fragmentation analysis dashboards with optional A/B comparison", long_about = None)]
pub struct Cli {
    /// Primary JSON event log
    #[arg(value_name = "INPUT_FILE")]
    pub input_file: PathBuf,

    /// Secondary JSON event log for A/B comparison
    #[arg(long = "compare", value_name = "PATH")]
    pub compare: Option<PathBuf>,

    /// Output filename
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Labels for the two datasets in comparison mode (default: "Light Load" "Heavy Load")
    #[arg(long = "labels", num_args = 2, value_names = ["A", "B"])]
    pub labels: Option<Vec<String>>,

    /// Bin size in seconds for event counts (default: 0.5)
    #[arg(long = "bin", value_name = "SECONDS")]
    pub bin: Option<f64>,

    /// Maximum events to process per file (default: 50000, 0 = no limit)
    #[arg(long = "max-events", value_name = "N")]
    pub max_events: Option<usize>,

    /// Report format
    #[arg(long = "format", value_enum, default_value = "html")]
    pub format: OutputFormat,

    /// TOML file with default settings
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
