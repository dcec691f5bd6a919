//! touch-analyze: replay recorded touch traces through the analysis pipeline.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use touch_pattern::config::AnalyzerConfig;
use touch_pattern::pipeline::TouchAnalysisPipeline;
use touch_pattern::report;
use touch_pattern::trace::read_trace;

/// Touch pattern analyzer
#[derive(Parser, Debug)]
#[command(name = "touch-analyze", version, about)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a JSON-lines trace and report the result
    Analyze {
        /// Trace file (one touch sample per line)
        trace: PathBuf,

        /// Print the session export as JSON instead of the text report
        #[arg(long)]
        json: bool,

        /// Include raw patterns in the JSON export
        #[arg(long, requires = "json")]
        patterns: bool,
    },
    /// Print the effective configuration as TOML
    Config,
}

fn main() -> anyhow::Result<()> {
    // Parse CLI arguments first so we can use --verbose to set log level
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => AnalyzerConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AnalyzerConfig::default(),
    };

    match cli.command {
        Commands::Analyze {
            trace,
            json,
            patterns,
        } => run_analyze(&trace, json, patterns, config)?,
        Commands::Config => run_config(&config)?,
    }

    Ok(())
}

fn run_analyze(path: &Path, json: bool, include_patterns: bool, config: AnalyzerConfig) -> anyhow::Result<()> {
    let samples =
        read_trace(path).with_context(|| format!("failed to read trace {}", path.display()))?;
    if samples.is_empty() {
        warn!(path = %path.display(), "trace contains no samples");
    }
    info!(path = %path.display(), samples = samples.len(), "replaying trace");

    let mut pipeline = TouchAnalysisPipeline::new(config);
    let mut expired = 0usize;
    for sample in &samples {
        if let Some(profile) = pipeline.submit(sample) {
            expired += 1;
            if !json {
                println!("--- Session {} (time limit reached) ---", expired);
                println!("{}", report::summary(&profile));
            }
        }
    }
    pipeline.stop();

    if json {
        println!("{}", pipeline.export(include_patterns).to_pretty_json()?);
    } else {
        print!("{}", pipeline.report());
    }
    Ok(())
}

fn run_config(config: &AnalyzerConfig) -> anyhow::Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
