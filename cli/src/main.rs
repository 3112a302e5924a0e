use std::io;
use std::path::PathBuf;

use clap::Parser;
use openapi_fragments_core::PathCollisionPolicy;
use openapi_fragments_store::{RunConfig, RunMode, RunSummary, StoreError, run};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "openapi-fragments")]
#[command(version)]
#[command(about = "Check and merge per-resource OpenAPI fragments into one document")]
struct Cli {
    /// Directory of fragment files (default: openapi).
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Merged document path (default: api.yaml).
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// YAML run configuration; flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Worker threads for fidelity checks (default: number of CPUs).
    #[arg(short, long)]
    jobs: Option<usize>,
    /// Check fidelity and merge without writing the output.
    #[arg(long)]
    check: bool,
    /// Fail when two fragments define the same path and method instead of
    /// keeping the later one.
    #[arg(long)]
    reject_duplicate_paths: bool,
    /// Title written to the merged document.
    #[arg(long)]
    title: Option<String>,
    /// API version written to the merged document.
    #[arg(long)]
    api_version: Option<String>,
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run_cli(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Filter used when `RUST_LOG` is unset.
fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

fn init_logging(verbose: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level(verbose).into()),
        )
        .with_writer(io::stderr)
        .init();
}

fn run_cli(cli: Cli) -> Result<(), StoreError> {
    let mode = if cli.check {
        RunMode::CheckOnly
    } else {
        RunMode::Merge
    };
    let config = resolve_config(cli)?;
    debug!(?config, "resolved run configuration");

    let summary = run(&config, mode)?;
    print_summary(&summary);
    Ok(())
}

fn resolve_config(cli: Cli) -> Result<RunConfig, StoreError> {
    let mut config = match &cli.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };

    if let Some(input) = cli.input {
        config.input_dir = input;
    }
    if let Some(output) = cli.output {
        config.output = output;
    }
    if cli.jobs.is_some() {
        config.jobs = cli.jobs;
    }
    if cli.reject_duplicate_paths {
        config.merge.path_collisions = PathCollisionPolicy::Reject;
    }
    if let Some(title) = cli.title {
        config.merge.title = title;
    }
    if let Some(version) = cli.api_version {
        config.merge.version = version;
    }

    Ok(config)
}

fn print_summary(summary: &RunSummary) {
    let counts = format!(
        "{} fragment(s), {} path(s), {} operation(s), {} schema(s)",
        summary.fragments, summary.paths, summary.operations, summary.schemas
    );
    match &summary.output {
        Some(path) => println!("Merged {counts} into {}.", path.display()),
        None => println!("Checked {counts}; no output written."),
    }
}
