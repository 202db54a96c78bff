//! Decompression stage: turn raw gzip artifacts into row-bearing reports.
//!
//! A corrupt stream fails only its own job; a report with zero data rows is a
//! valid outcome and is dropped silently. Both are counted for the run report.

use crate::acquire::JobOutcome;
use crate::jobs::ReportJob;
use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Tab-separated report content with job provenance.
#[derive(Debug, Clone)]
pub struct DecompressedReport {
    pub index: usize,
    pub job: ReportJob,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Default)]
pub struct DecompressStats {
    pub usable: usize,
    pub corrupt: usize,
    pub empty: usize,
}

#[derive(Debug)]
pub struct DecompressOutput {
    pub reports: Vec<DecompressedReport>,
    pub stats: DecompressStats,
}

/// Decompress every successfully fetched artifact, preserving job order.
pub fn decompress_all(outcomes: &[JobOutcome]) -> DecompressOutput {
    let mut reports = Vec::new();
    let mut stats = DecompressStats::default();

    for outcome in outcomes {
        let Ok(path) = &outcome.result else { continue };
        match decompress_one(path) {
            Ok(Some((header, rows))) => {
                stats.usable += 1;
                reports.push(DecompressedReport {
                    index: outcome.index,
                    job: outcome.job.clone(),
                    header,
                    rows,
                });
            }
            Ok(None) => {
                stats.empty += 1;
                debug!(job = %outcome.job.label(), "artifact contained no data rows, dropped");
            }
            Err(e) => {
                stats.corrupt += 1;
                warn!(job = %outcome.job.label(), "corrupt artifact dropped: {e:#}");
            }
        }
    }

    DecompressOutput { reports, stats }
}

type Table = (Vec<String>, Vec<Vec<String>>);

/// `Ok(None)` means the artifact decompressed cleanly but carried no rows.
fn decompress_one(path: &Path) -> Result<Option<Table>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut text = String::new();
    GzDecoder::new(file)
        .read_to_string(&mut text)
        .with_context(|| format!("decompressing {}", path.display()))?;

    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let Some(header_line) = lines.next() else {
        return Ok(None);
    };
    let header: Vec<String> = header_line
        .split('\t')
        .map(|c| c.trim().to_string())
        .collect();
    let rows: Vec<Vec<String>> = lines
        .map(|l| l.split('\t').map(|c| c.trim().to_string()).collect())
        .collect();

    if rows.is_empty() {
        return Ok(None);
    }
    Ok(Some((header, rows)))
}
