use super::{ReportService, ServiceError, SessionParams};
use crate::config::Config;
use crate::fiscal;
use crate::jobs::{JobKey, ReportJob};
use std::time::Duration;
use tracing::debug;

/// HTTP-backed implementation of [`ReportService`].
///
/// The wire details stay here; everything above this type only sees the
/// classified error contract.
pub struct HttpReportService {
    client: reqwest::blocking::Client,
    endpoint: String,
    access_token: String,
    account: String,
    mode: String,
    date_type: String,
    report_subtype: String,
}

impl HttpReportService {
    pub fn new(cfg: &Config, access_token: &str, account: &str) -> Result<Self, ServiceError> {
        let endpoint = cfg.acquisition.endpoint.trim().to_string();
        if endpoint.is_empty() {
            return Err(ServiceError::Session(
                "acquisition.endpoint is not configured".into(),
            ));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(cfg.acquisition.request_timeout_seconds))
            .build()
            .map_err(|e| ServiceError::Session(format!("building HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint,
            access_token: access_token.to_string(),
            account: account.to_string(),
            mode: cfg.acquisition.mode.clone(),
            date_type: cfg.acquisition.date_type.clone(),
            report_subtype: cfg.acquisition.report_subtype.clone(),
        })
    }

    fn query_for(&self, job: &ReportJob) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("account", self.account.clone()),
            ("vendor", job.vendor.clone()),
            ("report_type", job.report_type.to_string()),
            ("report_subtype", self.report_subtype.clone()),
            ("mode", self.mode.clone()),
        ];
        match &job.key {
            JobKey::Daily { date } => {
                params.push(("date_type", self.date_type.clone()));
                params.push(("report_date", fiscal::format_date(*date)));
            }
            JobKey::Periodic { region, period } => {
                params.push(("region", region.clone()));
                params.push(("fiscal_year", period.year.to_string()));
                params.push(("fiscal_period", period.period.to_string()));
            }
        }
        params
    }
}

impl ReportService for HttpReportService {
    fn open_session(&self, session: &SessionParams) -> Result<(), ServiceError> {
        let url = format!("{}/session", self.endpoint);
        debug!("opening report session account={}", session.account);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&session.access_token)
            .query(&[
                ("account", session.account.as_str()),
                ("mode", session.mode.as_str()),
                ("report_type", session.report_type.as_str()),
            ])
            .send()
            .map_err(|e| ServiceError::Session(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ServiceError::Session(format!("HTTP {}", resp.status())));
        }
        Ok(())
    }

    fn fetch(&self, job: &ReportJob) -> Result<Vec<u8>, ServiceError> {
        let url = format!("{}/report", self.endpoint);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&self.query_for(job))
            .send()
            .map_err(classify_transport_error)?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ServiceError::Unauthorized(format!("HTTP {status}")));
        }
        if status == reqwest::StatusCode::BAD_REQUEST || status == reqwest::StatusCode::NOT_FOUND {
            return Err(ServiceError::UnknownParameters(format!("HTTP {status}")));
        }
        if !status.is_success() {
            // 5xx and everything else unexpected: worth another try.
            return Err(ServiceError::ConnectionReset(format!("HTTP {status}")));
        }

        let bytes = resp
            .bytes()
            .map_err(|e| ServiceError::CorruptStream(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

fn classify_transport_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        ServiceError::ConnectionReset(err.to_string())
    } else if err.is_connect() {
        ServiceError::HostNotFound(err.to_string())
    } else if err.is_body() || err.is_decode() {
        ServiceError::CorruptStream(err.to_string())
    } else {
        ServiceError::ConnectionReset(err.to_string())
    }
}
