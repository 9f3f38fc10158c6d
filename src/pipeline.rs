// src/pipeline.rs
use anyhow::Result;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::{config::Config, load, process, write};

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The three tables were written.
    Completed {
        rows: usize,
        output_dir: PathBuf,
        files: Vec<PathBuf>,
        failed_batches: Vec<String>,
    },
    /// Nothing could be loaded, so nothing was written.
    NoData { failed_batches: Vec<String> },
}

/// Load → unify → reconcile → date → write.
#[tracing::instrument(level = "info", skip(config), fields(input = %config.input_pattern))]
pub fn run(config: &Config) -> Result<RunOutcome> {
    let report = load::load_batches(&config.input_pattern)?;
    let failed_batches = report.failed_names();
    if !failed_batches.is_empty() {
        warn!("{} batch(es) skipped", failed_batches.len());
    }

    let Some(table) = process::transform(report.batches) else {
        warn!(
            "no data to process: no batch under '{}' could be read",
            config.input_pattern
        );
        return Ok(RunOutcome::NoData { failed_batches });
    };

    let files = write::write_all(&table, &config.output_dir)?;
    info!(rows = table.len(), "reconciled and partitioned");

    Ok(RunOutcome::Completed {
        rows: table.len(),
        output_dir: config.output_dir.clone(),
        files,
        failed_batches,
    })
}
