// src/load/mod.rs
use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use glob::glob;
use std::{
    collections::HashMap,
    fs::File,
    io::{Cursor, Read},
    path::Path,
};
use tracing::{debug, error, info};
use zip::ZipArchive;

use crate::process::utils::infer_value;
use crate::table::{Batch, RowTable};

/// Upper bound on what a member's declared size may pre-allocate.
const MAX_PREALLOC: usize = 64 << 20;

/// A batch that could not be read, with the rendered cause.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchFailure {
    pub name: String,
    pub reason: String,
}

/// Everything the loader produced: readable batches in discovery order and
/// the ones it had to skip.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub batches: Vec<Batch>,
    pub failures: Vec<BatchFailure>,
}

impl LoadReport {
    pub fn failed_names(&self) -> Vec<String> {
        self.failures.iter().map(|f| f.name.clone()).collect()
    }
}

/// Load every archive matching `pattern`. A bad batch is logged and skipped;
/// only an invalid pattern is an error.
#[tracing::instrument(level = "info")]
pub fn load_batches(pattern: &str) -> Result<LoadReport> {
    let entries =
        glob(pattern).with_context(|| format!("Failed to read glob pattern '{}'", pattern))?;

    let mut report = LoadReport::default();
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                let name = e.path().display().to_string();
                error!(batch = %name, "failed to access batch: {}", e);
                report.failures.push(BatchFailure {
                    name,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let name = path.display().to_string();
        match load_batch(&path) {
            Ok(table) => {
                info!(batch = %name, rows = table.len(), columns = table.headers.len(), "loaded");
                report.batches.push(Batch { name, table });
            }
            Err(e) => {
                error!(batch = %name, "failed to read batch: {:#}", e);
                report.failures.push(BatchFailure {
                    name,
                    reason: format!("{:#}", e),
                });
            }
        }
    }

    Ok(report)
}

/// Open one zip archive, pull out its single CSV member and parse it.
pub fn load_batch(zip_path: &Path) -> Result<RowTable> {
    let file = File::open(zip_path)
        .with_context(|| format!("Failed to open ZIP file: {:?}", zip_path))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("Failed to read ZIP archive: {:?}", zip_path))?;

    let mut members = Vec::new();
    for i in 0..archive.len() {
        let entry = archive
            .by_index(i)
            .with_context(|| format!("Failed to access ZIP entry #{} in {:?}", i, zip_path))?;
        if entry.is_file() && !entry.name().starts_with("__MACOSX/") {
            members.push((i, entry.name().to_string()));
        }
    }

    let (index, member) = match members.as_slice() {
        [] => bail!("archive contains no data file"),
        [only] => only.clone(),
        many => bail!(
            "archive holds {} files, expected exactly one: {}",
            many.len(),
            many.iter()
                .map(|(_, n)| n.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    };

    let mut buf = Vec::new();
    {
        let mut entry = archive.by_index(index)?;
        buf.reserve(prealloc_hint(entry.size()));
        entry
            .read_to_end(&mut buf)
            .with_context(|| format!("Failed to decompress {}", member))?;
    }
    // release the archive handle before parsing
    drop(archive);

    debug!(member = %member, bytes = buf.len(), "decompressed");
    parse_csv(&buf).with_context(|| format!("Failed to parse {}", member))
}

/// The archive header's size claim, capped so a forged entry cannot force a
/// huge allocation.
fn prealloc_hint(declared: u64) -> usize {
    usize::try_from(declared).map_or(MAX_PREALLOC, |n| n.min(MAX_PREALLOC))
}

/// Parse comma-separated text whose first record is the header.
pub fn parse_csv(data: &[u8]) -> Result<RowTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(Cursor::new(data));

    let raw_headers = rdr.headers().context("CSV header read error")?.clone();
    if raw_headers.iter().all(|h| h.trim().is_empty()) {
        bail!("no header row");
    }
    let mut table = RowTable::new(dedup_headers(raw_headers.iter()));

    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", idx + 1))?;
        table.rows.push(record.iter().map(infer_value).collect());
    }

    Ok(table)
}

/// Repeated header names become `name.1`, `name.2`, ...
fn dedup_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::new();
    for h in headers {
        let h = h.trim().to_string();
        let n = seen.entry(h.clone()).or_insert(0);
        if *n == 0 {
            out.push(h);
        } else {
            out.push(format!("{}.{}", h, n));
        }
        *n += 1;
    }
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::table::Value;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use zip::write::FileOptions;
    use zip::CompressionMethod;

    pub(crate) fn init_test_logging() {
        let subscriber = tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    /// Write `members` (name, contents) into a zip at `dir/file_name`.
    pub(crate) fn write_zip(dir: &Path, file_name: &str, members: &[(&str, &str)]) -> Result<PathBuf> {
        let path = dir.join(file_name);
        let mut zip = zip::ZipWriter::new(File::create(&path)?);
        let options: FileOptions<'_, ()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, content) in members {
            zip.start_file(*name, options)?;
            zip.write_all(content.as_bytes())?;
        }
        zip.finish()?;
        Ok(path)
    }

    #[test]
    fn loads_single_member_archive() -> Result<()> {
        init_test_logging();
        let dir = TempDir::new()?;
        let path = write_zip(
            dir.path(),
            "bank.csv.zip",
            &[(
                "bank.csv",
                "age,job,day,euribor3m\n30,admin.,3,4.857\n41,blue-collar,21,\n",
            )],
        )?;

        let table = load_batch(&path)?;
        assert_eq!(table.headers, vec!["age", "job", "day", "euribor3m"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][1], Value::text("admin."));
        assert_eq!(table.rows[0][3], Value::Decimal(4.857));
        assert_eq!(table.rows[1][3], Value::Missing);
        Ok(())
    }

    #[test]
    fn rejects_archives_without_exactly_one_member() -> Result<()> {
        let dir = TempDir::new()?;
        let empty = write_zip(dir.path(), "empty.csv.zip", &[])?;
        let err = load_batch(&empty).unwrap_err();
        assert!(format!("{:#}", err).contains("no data file"));

        let two = write_zip(dir.path(), "two.csv.zip", &[("a.csv", "x\n1\n"), ("b.csv", "x\n2\n")])?;
        let err = load_batch(&two).unwrap_err();
        assert!(format!("{:#}", err).contains("expected exactly one"));
        Ok(())
    }

    #[test]
    fn malformed_csv_is_an_error() {
        assert!(parse_csv(b"a,b\n1,2\n3,4,5\n").is_err());
        assert!(parse_csv(b"").is_err());
    }

    #[test]
    fn header_only_csv_has_no_rows() -> Result<()> {
        let table = parse_csv(b"a,b\n")?;
        assert_eq!(table.headers, vec!["a", "b"]);
        assert!(table.is_empty());
        Ok(())
    }

    #[test]
    fn declared_member_size_is_capped() {
        assert_eq!(prealloc_hint(1024), 1024);
        assert_eq!(prealloc_hint(u64::MAX), MAX_PREALLOC);
        assert_eq!(prealloc_hint(MAX_PREALLOC as u64 + 1), MAX_PREALLOC);
    }

    #[test]
    fn escaped_quotes_survive_parsing() -> Result<()> {
        let table = parse_csv(b"job,marital\n\"\"\"x\"\"\", single \n")?;
        assert_eq!(table.rows[0][0], Value::text("\"x\""));
        assert_eq!(table.rows[0][1], Value::text("single"));
        Ok(())
    }

    #[test]
    fn duplicate_headers_are_disambiguated() -> Result<()> {
        let table = parse_csv(b"job,job,age\nx,y,1\n")?;
        assert_eq!(table.headers, vec!["job", "job.1", "age"]);
        Ok(())
    }

    #[test]
    fn corrupt_batch_is_reported_and_skipped() -> Result<()> {
        init_test_logging();
        let dir = TempDir::new()?;
        write_zip(dir.path(), "a.csv.zip", &[("a.csv", "age\n30\n")])?;
        std::fs::write(dir.path().join("b.csv.zip"), b"definitely not a zip")?;
        write_zip(dir.path(), "c.csv.zip", &[("c.csv", "age\n31\n32\n")])?;

        let pattern = format!("{}/*.csv.zip", dir.path().display());
        let report = load_batches(&pattern)?;

        assert_eq!(report.batches.len(), 2);
        assert!(report.batches[0].name.ends_with("a.csv.zip"));
        assert!(report.batches[1].name.ends_with("c.csv.zip"));
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].name.ends_with("b.csv.zip"));
        assert!(report.failures[0].reason.contains("ZIP"));
        Ok(())
    }

    #[test]
    fn invalid_pattern_is_fatal() {
        assert!(load_batches("files/[").is_err());
    }
}
