mod shell;

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use editor3d_config::EditorConfig;

use crate::shell::Shell;

/// A headless 3D scene editor with undo/redo.
#[derive(Parser, Debug)]
#[command(name = "editor3d", version, about)]
struct Cli {
    /// Read commands from this file instead of stdin.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Use this config file instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(EditorConfig::config_path);
    let (config, config_problem) = EditorConfig::load_or_create(&config_path);

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .with_writer(io::stderr)
        .init();

    tracing::info!(config = %config_path.display(), "Starting editor3d");
    report_config_problem(&config_path, config_problem.as_ref());

    let stdout = io::stdout();
    run(&cli, &config, stdout.lock())
}

/// Logs a config that could not be loaded or created. Needs a running
/// subscriber, so it is called after logging is initialised.
fn report_config_problem(path: &Path, problem: Option<&anyhow::Error>) {
    if let Some(e) = problem {
        tracing::warn!(config = %path.display(), "Using default config: {e:#}");
    }
}

/// Runs the shell over the script named on the command line, or stdin.
fn run<W: Write>(cli: &Cli, config: &EditorConfig, out: W) -> Result<()> {
    let mut shell = Shell::new(config, out);
    match &cli.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open script {}", path.display()))?;
            shell.run(BufReader::new(file))
        }
        None => shell.run(io::stdin().lock()),
    }
}
