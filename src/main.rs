//! tagdoc — build a documentation model from `/*** … */` tag comments.
//!
//! Reads `settings.json` (written with defaults on first run), walks the
//! project, and writes `docs.json` into the output directory:
//!
//! - `tagdoc` — use the settings file as-is
//! - `tagdoc ./src -o docs --include-tests` — override settings from the command line
//! - `tagdoc --stdout` — print the JSON instead of writing it

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tagdoc::{pipeline, render, settings::Settings};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "tagdoc",
    about = "Extract tag-based documentation comments into a structured package model"
)]
struct Cli {
    /// Project directory to scan (overrides project_path from settings)
    path: Option<PathBuf>,

    /// Settings file; created with defaults if missing
    #[arg(short = 's', long, default_value = tagdoc::settings::SETTINGS_FILE)]
    settings: PathBuf,

    /// Output directory (overrides output_path from settings)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Also scan *_test files
    #[arg(long)]
    include_tests: bool,

    /// Title-case package names
    #[arg(long)]
    capitalize: bool,

    /// Print JSON to stdout instead of writing docs.json
    #[arg(long)]
    stdout: bool,

    /// Exit with an error status when any warning was reported
    #[arg(long)]
    deny_warnings: bool,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut settings = Settings::load_or_create(&cli.settings)?;
    apply_overrides(&mut settings, &cli);

    let report = pipeline::run_project(&settings);
    for warning in &report.warnings {
        warn!("{}", warning);
    }

    let json = render::to_json(&report, &settings).context("failed to serialize documentation")?;
    if cli.stdout {
        print!("{}", json);
    } else {
        let out_dir = &settings.output_path;
        fs::create_dir_all(out_dir)
            .with_context(|| format!("failed to create output directory: {}", out_dir.display()))?;
        let out_path = out_dir.join(render::OUTPUT_FILE);
        fs::write(&out_path, json)
            .with_context(|| format!("failed to write {}", out_path.display()))?;
        info!(path = %out_path.display(), "wrote documentation model");
    }

    if cli.deny_warnings && !report.warnings.is_empty() {
        anyhow::bail!("{} warning(s) reported", report.warnings.len());
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "tagdoc=debug" } else { "tagdoc=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Command-line flags win over the settings file.
fn apply_overrides(settings: &mut Settings, cli: &Cli) {
    if let Some(ref path) = cli.path {
        settings.project_path = path.clone();
    }
    if let Some(ref output) = cli.output {
        settings.output_path = output.clone();
    }
    settings.include_tests |= cli.include_tests;
    settings.capitalize_items |= cli.capitalize;
}
