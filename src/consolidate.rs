//! Consolidation fan-in: merge per-job reports into one schema-conformant
//! dataset and emit its load manifest.

use crate::decompress::DecompressedReport;
use crate::util::ensure_dir;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("no usable report rows were produced by any job; refusing to write an empty dataset")]
pub struct DatasetEmptyError;

/// Sidecar metadata telling the downstream loader how to treat the dataset.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub incremental: bool,
    pub primary_key: Vec<String>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            incremental: true,
            primary_key: vec!["id".into()],
        }
    }
}

#[derive(Debug)]
pub struct ConsolidatedOutput {
    pub dataset_path: PathBuf,
    pub manifest_path: Option<PathBuf>,
    pub rows_written: usize,
}

/// Write one dataset: header exactly once, then every row from every report
/// in job-expansion order, projected onto the fixed `keys` by column name.
/// Missing columns become empty fields; unrecognized source columns are
/// dropped. Fails with [`DatasetEmptyError`] before touching the filesystem
/// when there is nothing to write.
pub fn consolidate(
    reports: &[DecompressedReport],
    keys: &[&str],
    out_dir: &Path,
    file_name: &str,
    write_manifest: bool,
) -> Result<ConsolidatedOutput> {
    let total_rows: usize = reports.iter().map(|r| r.rows.len()).sum();
    if total_rows == 0 {
        return Err(DatasetEmptyError.into());
    }

    ensure_dir(out_dir)?;
    let dataset_path = out_dir.join(file_name);
    let mut wtr = csv::Writer::from_path(&dataset_path)
        .with_context(|| format!("creating dataset {}", dataset_path.display()))?;
    wtr.write_record(keys)?;

    let mut rows_written = 0usize;
    for report in reports {
        // Column positions resolved once per source file, by header name.
        let lookup: Vec<Option<usize>> = keys
            .iter()
            .map(|key| report.header.iter().position(|h| h == key))
            .collect();
        for row in &report.rows {
            let record: Vec<&str> = lookup
                .iter()
                .map(|pos| {
                    pos.and_then(|i| row.get(i))
                        .map(String::as_str)
                        .unwrap_or("")
                })
                .collect();
            wtr.write_record(&record)?;
            rows_written += 1;
        }
    }
    wtr.flush()
        .with_context(|| format!("flushing dataset {}", dataset_path.display()))?;

    let manifest_path = if write_manifest {
        let path = out_dir.join(format!("{file_name}.manifest"));
        std::fs::write(&path, serde_json::to_string_pretty(&Manifest::default())?)
            .with_context(|| format!("writing manifest {}", path.display()))?;
        Some(path)
    } else {
        None
    };

    Ok(ConsolidatedOutput {
        dataset_path,
        manifest_path,
        rows_written,
    })
}
