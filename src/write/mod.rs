// src/write/mod.rs
use anyhow::{Context, Result};
use csv::{Terminator, WriterBuilder};
use std::{
    borrow::Cow,
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::table::{CombinedTable, Value};

/// One of the fixed output files and its column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputTable {
    pub file_name: &'static str,
    pub columns: &'static [&'static str],
}

pub const CLIENT: OutputTable = OutputTable {
    file_name: "client.csv",
    columns: &[
        "client_id",
        "age",
        "job",
        "marital",
        "education",
        "credit_default",
        "mortgage",
    ],
};

pub const CAMPAIGN: OutputTable = OutputTable {
    file_name: "campaign.csv",
    columns: &[
        "client_id",
        "number_contacts",
        "contact_duration",
        "previous_campaign_contacts",
        "previous_outcome",
        "campaign_outcome",
        "last_contact_date",
    ],
};

pub const ECONOMICS: OutputTable = OutputTable {
    file_name: "economics.csv",
    columns: &["client_id", "cons_price_idx", "euribor_three_months"],
};

pub const OUTPUT_TABLES: [OutputTable; 3] = [CLIENT, CAMPAIGN, ECONOMICS];

/// Rows of the combined table restricted to one output's columns.
#[derive(Debug)]
pub struct Projection<'t> {
    pub output: OutputTable,
    pub rows: Vec<Vec<&'t Value>>,
}

/// Project every combined row onto `output`, in combined order.
pub fn project(table: &CombinedTable, output: OutputTable) -> Projection<'_> {
    let rows = (0..table.len())
        .map(|r| output.columns.iter().map(|c| table.get(r, c)).collect())
        .collect();
    Projection { output, rows }
}

/// The three output projections.
pub fn partition(table: &CombinedTable) -> Vec<Projection<'_>> {
    OUTPUT_TABLES.iter().map(|o| project(table, *o)).collect()
}

/// Write `projection` as `<out_dir>/<file_name>`. The data goes to a hidden
/// temp file first and is renamed over the target.
pub fn write_projection(projection: &Projection<'_>, out_dir: &Path) -> Result<PathBuf> {
    let path = out_dir.join(projection.output.file_name);
    let tmp_path = out_dir.join(format!(".{}.tmp", projection.output.file_name));

    {
        let file = File::create(&tmp_path)
            .with_context(|| format!("creating {:?}", tmp_path))?;
        let mut wtr = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_writer(BufWriter::new(file));

        wtr.write_record(projection.output.columns)?;
        for row in &projection.rows {
            let fields: Vec<Cow<'_, str>> = row.iter().map(|v| v.to_field()).collect();
            wtr.write_record(fields.iter().map(|f| f.as_bytes()))?;
        }
        wtr.flush()
            .with_context(|| format!("flushing {:?}", tmp_path))?;
    }

    fs::rename(&tmp_path, &path)
        .with_context(|| format!("renaming {:?} -> {:?}", tmp_path, path))?;
    Ok(path)
}

/// Create `out_dir` if needed and write all three tables into it.
pub fn write_all(table: &CombinedTable, out_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {:?}", out_dir))?;

    let mut written = Vec::with_capacity(OUTPUT_TABLES.len());
    for projection in partition(table) {
        let path = write_projection(&projection, out_dir)?;
        info!(file = %path.display(), rows = projection.rows.len(), "wrote");
        written.push(path);
    }
    Ok(written)
}
