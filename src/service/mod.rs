pub mod http;

use crate::jobs::ReportJob;
use crate::schema::ReportType;
use thiserror::Error;

pub use http::HttpReportService;

/// One-time session establishment parameters.
#[derive(Debug, Clone)]
pub struct SessionParams {
    pub access_token: String,
    pub account: String,
    pub mode: String,
    pub report_type: ReportType,
}

/// Classified failures from the remote reporting service.
///
/// Transient variants are retried with backoff; permanent variants fail the
/// job immediately. `Session` is fatal for the whole run.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("report host could not be resolved: {0}")]
    HostNotFound(String),
    #[error("connection reset while fetching report: {0}")]
    ConnectionReset(String),
    #[error("compressed report stream was interrupted: {0}")]
    CorruptStream(String),
    #[error("the reporting service denied access: {0}")]
    Unauthorized(String),
    #[error("the reporting service rejected the report parameters: {0}")]
    UnknownParameters(String),
    #[error("session could not be established: {0}")]
    Session(String),
}

impl ServiceError {
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ServiceError::HostNotFound(_)
                | ServiceError::ConnectionReset(_)
                | ServiceError::CorruptStream(_)
        )
    }
}

/// Observable contract of the remote reporting service: establish a session
/// once, then fetch one compressed artifact per job. Implementations must be
/// shareable across the acquisition fan-out, and a test double can stand in
/// without any network dependency.
pub trait ReportService: Send + Sync {
    fn open_session(&self, session: &SessionParams) -> Result<(), ServiceError>;

    fn fetch(&self, job: &ReportJob) -> Result<Vec<u8>, ServiceError>;
}
