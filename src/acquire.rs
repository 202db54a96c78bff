//! Acquisition fan-out: fetch every job's compressed artifact with bounded
//! retry, without letting one failed job take its siblings down.

use crate::config::Retry;
use crate::jobs::ReportJob;
use crate::service::{ReportService, ServiceError, SessionParams};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a single job was excluded from the rest of the run.
#[derive(Debug, Error)]
pub enum JobFailure {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("could not store artifact: {0}")]
    Artifact(String),
}

/// Outcome of one job, kept in expansion order.
#[derive(Debug)]
pub struct JobOutcome {
    pub index: usize,
    pub job: ReportJob,
    pub attempts: u32,
    pub result: Result<PathBuf, JobFailure>,
}

/// Establish the session, then fetch all jobs on a private bounded pool.
///
/// Session failure is fatal; per-job failures are absorbed into the outcome
/// list. The returned vector is in job-expansion order regardless of
/// completion order.
pub fn fetch_all<S: ReportService>(
    service: &S,
    session: &SessionParams,
    jobs: &[ReportJob],
    workdir: &Path,
    retry: &Retry,
    max_parallel: usize,
) -> Result<Vec<JobOutcome>> {
    service
        .open_session(session)
        .context("report service session could not be established")?;

    // Private pool: the remote service is rate-limited, so the fan-out is
    // capped instead of borrowing the global pool's width.
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(max_parallel.max(1))
        .thread_name(|i| format!("vendorpull-fetch-{i}"))
        .build()
        .context("failed to build acquisition thread pool")?;

    let outcomes = pool.install(|| {
        jobs.par_iter()
            .enumerate()
            .map(|(index, job)| fetch_one(service, index, job, workdir, retry))
            .collect::<Vec<_>>()
    });

    Ok(outcomes)
}

/// Delay before attempt n: `base_delay_ms * 2^(n-2)`, with the exponent
/// capped so an oversized retry budget cannot overflow the multiplier.
pub fn backoff_delay(retry: &Retry, attempt: u32) -> Duration {
    let factor = 1u64 << (attempt.saturating_sub(2)).min(16);
    Duration::from_millis(retry.base_delay_ms.saturating_mul(factor))
}

fn fetch_one<S: ReportService>(
    service: &S,
    index: usize,
    job: &ReportJob,
    workdir: &Path,
    retry: &Retry,
) -> JobOutcome {
    let max_attempts = retry.max_attempts.max(1);
    let mut last_error: Option<ServiceError> = None;

    for attempt in 1..=max_attempts {
        if attempt > 1 {
            std::thread::sleep(backoff_delay(retry, attempt));
        }

        match service.fetch(job) {
            Ok(bytes) => {
                let path = workdir.join(job.artifact_name());
                return match std::fs::write(&path, &bytes) {
                    Ok(()) => {
                        debug!(job = %job.label(), attempt, bytes = bytes.len(), "artifact stored");
                        JobOutcome {
                            index,
                            job: job.clone(),
                            attempts: attempt,
                            result: Ok(path),
                        }
                    }
                    Err(e) => JobOutcome {
                        index,
                        job: job.clone(),
                        attempts: attempt,
                        result: Err(JobFailure::Artifact(format!("{}: {e}", path.display()))),
                    },
                };
            }
            Err(e) if e.is_transient() && attempt < max_attempts => {
                warn!(job = %job.label(), attempt, "transient fetch failure, will retry: {e}");
                last_error = Some(e);
            }
            Err(e) if e.is_transient() => {
                warn!(job = %job.label(), attempt, "retry budget exhausted: {e}");
                last_error = Some(e);
            }
            Err(e) => {
                warn!(job = %job.label(), attempt, "permanent fetch failure: {e}");
                return JobOutcome {
                    index,
                    job: job.clone(),
                    attempts: attempt,
                    result: Err(e.into()),
                };
            }
        }
    }

    let error =
        last_error.unwrap_or_else(|| ServiceError::ConnectionReset("retry budget exhausted".into()));
    JobOutcome {
        index,
        job: job.clone(),
        attempts: max_attempts,
        result: Err(error.into()),
    }
}
