use crate::{
    acquire,
    config::{Config, RunConfig},
    consolidate,
    decompress,
    jobs,
    report::{JobFailureReport, RunReport},
    service::{ReportService, SessionParams},
    util::now_rfc3339,
};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub struct Pipeline<S: ReportService> {
    cfg: Config,
    run: RunConfig,
    service: S,
}

#[derive(Debug)]
pub struct RunOutput {
    pub dataset_path: PathBuf,
    pub manifest_path: Option<PathBuf>,
    pub report: RunReport,
}

impl<S: ReportService> Pipeline<S> {
    pub fn new(cfg: &Config, run: &RunConfig, service: S) -> Self {
        Self {
            cfg: cfg.clone(),
            run: run.clone(),
            service,
        }
    }

    /// Expand, acquire (the only parallel stage), decompress, consolidate.
    ///
    /// Job-level failures are absorbed and tallied; the run only fails when
    /// configuration or session setup fails, or when zero usable rows remain.
    pub fn execute(&self, run_id: &str, workdir: &Path, out_dir: &Path) -> Result<RunOutput> {
        let started = now_rfc3339();

        let job_list = jobs::expand(&self.run);
        info!(
            "expanded {} fetch jobs for {} run ({} vendors, {} dates, {} periods)",
            job_list.len(),
            self.run.report_type,
            self.run.vendors.len(),
            self.run.dates.len(),
            self.run.periods.len()
        );

        let session = SessionParams {
            access_token: self.run.access_token.clone(),
            account: self.run.account.clone(),
            mode: self.cfg.acquisition.mode.clone(),
            report_type: self.run.report_type,
        };

        let outcomes = acquire::fetch_all(
            &self.service,
            &session,
            &job_list,
            workdir,
            &self.cfg.retry,
            self.cfg.acquisition.max_parallel_jobs,
        )?;

        let failures: Vec<JobFailureReport> = outcomes
            .iter()
            .filter_map(|o| {
                o.result.as_ref().err().map(|e| JobFailureReport {
                    job: o.job.label(),
                    attempts: o.attempts,
                    error: e.to_string(),
                })
            })
            .collect();
        let jobs_succeeded = outcomes.len() - failures.len();
        if !failures.is_empty() {
            warn!(
                "{} of {} jobs excluded after retries",
                failures.len(),
                outcomes.len()
            );
        }

        let decompressed = decompress::decompress_all(&outcomes);
        info!(
            "decompression: {} usable, {} empty, {} corrupt",
            decompressed.stats.usable, decompressed.stats.empty, decompressed.stats.corrupt
        );

        let consolidated = consolidate::consolidate(
            &decompressed.reports,
            self.run.report_type.keys(),
            out_dir,
            &self.run.file_name,
            self.cfg.output.write_manifest,
        )?;
        info!(
            "consolidated {} rows into {}",
            consolidated.rows_written,
            consolidated.dataset_path.display()
        );

        let report = RunReport {
            run_id: run_id.to_string(),
            report_type: self.run.report_type,
            started,
            finished: now_rfc3339(),
            jobs_total: outcomes.len(),
            jobs_succeeded,
            jobs_failed: failures.len(),
            artifacts_corrupt: decompressed.stats.corrupt,
            artifacts_empty: decompressed.stats.empty,
            rows_written: consolidated.rows_written,
            failures,
        };

        Ok(RunOutput {
            dataset_path: consolidated.dataset_path,
            manifest_path: consolidated.manifest_path,
            report,
        })
    }
}
