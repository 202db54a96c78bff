use crate::schema::ReportType;
use serde::Serialize;

/// Per-run observability record, written as `report.json` next to the
/// dataset.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub report_type: ReportType,
    pub started: String,
    pub finished: String,
    pub jobs_total: usize,
    pub jobs_succeeded: usize,
    pub jobs_failed: usize,
    pub artifacts_corrupt: usize,
    pub artifacts_empty: usize,
    pub rows_written: usize,
    pub failures: Vec<JobFailureReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobFailureReport {
    pub job: String,
    pub attempts: u32,
    pub error: String,
}
