use anyhow::Result;
use campaign_etl::{
    config::Config,
    pipeline::{self, RunOutcome},
};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Split zipped marketing-campaign CSVs into client, campaign and economics tables.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Glob pattern for the input archives
    #[arg(short, long)]
    input: Option<String>,

    /// Directory receiving client.csv, campaign.csv and economics.csv
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Optional YAML file with `input_pattern` / `output_dir`
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .init();

    // ─── 2) resolve configuration ────────────────────────────────────
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::from_yaml_file(path)?,
        None => Config::default(),
    }
    .with_overrides(args.input, args.output);
    info!(input = %config.input_pattern, output = %config.output_dir.display(), "startup");

    // ─── 3) run ──────────────────────────────────────────────────────
    match pipeline::run(&config)? {
        RunOutcome::Completed {
            rows,
            output_dir,
            failed_batches,
            ..
        } => {
            if !failed_batches.is_empty() {
                error!(
                    "completed with {} unreadable batch(es): {}",
                    failed_batches.len(),
                    failed_batches.join(", ")
                );
            }
            info!(rows, "cleaning and partitioning completed");
            info!("files written to {}", output_dir.display());
        }
        RunOutcome::NoData { .. } => {
            info!("no data found to process; no files written");
        }
    }
    Ok(())
}
