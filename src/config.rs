use crate::fiscal::{self, FiscalPeriod};
use crate::schema::{FINANCE_REGIONS, ReportType};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use time::{Date, Duration};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub fiscal: Fiscal,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub retry: Retry,
    #[serde(default)]
    pub acquisition: Acquisition,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub debug: Debug,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }

    /// A stable, normalization-friendly string for hashing.
    pub fn normalized_for_hash(&self) -> String {
        toml::to_string(self).unwrap_or_default()
    }

    /// TOML rendering safe to write next to run outputs: the access token
    /// is masked so the dump never carries the credential.
    pub fn redacted_toml(&self) -> String {
        let mut cfg = self.clone();
        if !cfg.parameters.access_token.is_empty() {
            cfg.parameters.access_token = "<redacted>".into();
        }
        toml::to_string(&cfg).unwrap_or_default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            parameters: Default::default(),
            paths: Default::default(),
            fiscal: Default::default(),
            limits: Default::default(),
            retry: Default::default(),
            acquisition: Default::default(),
            output: Default::default(),
            logging: Default::default(),
            debug: Default::default(),
        }
    }
}

/// Raw run parameters as they arrive from the config file, before validation.
///
/// `vendors` stays a loose TOML value so the validator can reject a scalar
/// with its own message instead of a generic deserialization error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Parameters {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub report_type: String,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub vendors: Option<toml::Value>,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paths {
    pub out_dir: String,
    pub work_dir: String,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            out_dir: "out".into(),
            work_dir: ".vendorpull-work".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fiscal {
    /// Zero-based calendar month at which the next fiscal year begins.
    pub initial_period: u8,
}
impl Default for Fiscal {
    fn default() -> Self {
        Self {
            initial_period: fiscal::DEFAULT_INITIAL_PERIOD,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum day count a sales run may span. Financial runs iterate fiscal
    /// periods, not days, and are not subject to this cap.
    pub maximum_interval_days: usize,
    /// How far back the start date defaults when absent.
    pub default_lookback_days: i64,
}
impl Default for Limits {
    fn default() -> Self {
        Self {
            maximum_interval_days: 60,
            default_lookback_days: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Retry {
    /// Total attempts per job, first try included.
    pub max_attempts: u32,
    /// Backoff before attempt n is `base_delay_ms * 2^(n-2)`.
    pub base_delay_ms: u64,
}
impl Default for Retry {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Acquisition {
    pub endpoint: String,
    pub max_parallel_jobs: usize,
    pub request_timeout_seconds: u64,
    pub mode: String,
    pub date_type: String,
    pub report_subtype: String,
}
impl Default for Acquisition {
    fn default() -> Self {
        Self {
            endpoint: "".into(),
            max_parallel_jobs: 4,
            request_timeout_seconds: 30,
            mode: "Robot.XML".into(),
            date_type: "Daily".into(),
            report_subtype: "Summary".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output {
    pub write_manifest: bool,
    pub write_report_json: bool,
    pub report_filename: String,
    pub print_summary: bool,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            write_manifest: true,
            write_report_json: true,
            report_filename: "report.json".into(),
            print_summary: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: true,
            file_path: "".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debug {
    pub dump_effective_config: bool,
}
impl Default for Debug {
    fn default() -> Self {
        Self {
            dump_effective_config: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("parameter access_token is not defined")]
    MissingAccessToken,
    #[error("parameter report_type is not defined")]
    MissingReportType,
    #[error("parameter account is not defined")]
    MissingAccount,
    #[error("parameter vendors is not defined")]
    MissingVendors,
    #[error("parameter vendors must be an array of vendor ids, even when there is just one")]
    VendorsNotArray,
    #[error("parameter report_type has invalid value {0:?}; specify either \"sales\" or \"financial\"")]
    UnknownReportType(String),
    #[error("invalid date mask for parameter {name}: {value:?} does not match YYYYMMDD")]
    BadDateMask { name: &'static str, value: String },
    #[error("parameter end_date {end} precedes start_date {start}")]
    EndBeforeStart { start: String, end: String },
    #[error("parameter end_date {end} exceeds the maximal allowed date {max}")]
    EndAfterMaximal { end: String, max: String },
    #[error("the selected interval is too big: {got} days; keep the date range at or below {max}")]
    IntervalTooLarge { got: usize, max: usize },
}

/// Validated, immutable run configuration with all derived dimensions.
#[derive(Debug, Clone, Serialize)]
pub struct RunConfig {
    #[serde(skip_serializing)]
    pub access_token: String,
    pub account: String,
    pub report_type: ReportType,
    pub vendors: Vec<String>,
    pub start_date: Date,
    pub end_date: Date,
    pub dates: Vec<Date>,
    pub periods: Vec<FiscalPeriod>,
    pub regions: Vec<String>,
    pub file_name: String,
}

impl RunConfig {
    /// Validate and normalize the raw parameter bag against `today`.
    ///
    /// Every rule produces its own [`ConfigError`]; the caller wraps the lot
    /// with one input-configuration context before surfacing it.
    pub fn from_config(cfg: &Config, today: Date) -> Result<Self, ConfigError> {
        let params = &cfg.parameters;

        if params.access_token.trim().is_empty() {
            return Err(ConfigError::MissingAccessToken);
        }
        if params.report_type.trim().is_empty() {
            return Err(ConfigError::MissingReportType);
        }
        if params.account.trim().is_empty() {
            return Err(ConfigError::MissingAccount);
        }

        let vendors = parse_vendors(params.vendors.as_ref())?;

        let report_type = ReportType::parse(params.report_type.trim())
            .ok_or_else(|| ConfigError::UnknownReportType(params.report_type.clone()))?;

        let maximal = today - Duration::days(1);
        let default_start = today - Duration::days(cfg.limits.default_lookback_days);

        let start_date = if params.start_date.trim().is_empty() {
            default_start
        } else {
            fiscal::parse_date(params.start_date.trim()).map_err(|_| ConfigError::BadDateMask {
                name: "start_date",
                value: params.start_date.clone(),
            })?
        };
        let end_date = if params.end_date.trim().is_empty() {
            maximal
        } else {
            fiscal::parse_date(params.end_date.trim()).map_err(|_| ConfigError::BadDateMask {
                name: "end_date",
                value: params.end_date.clone(),
            })?
        };

        if end_date > maximal {
            return Err(ConfigError::EndAfterMaximal {
                end: fiscal::format_date(end_date),
                max: fiscal::format_date(maximal),
            });
        }

        let dates = fiscal::dates_in_range(start_date, end_date).map_err(|_| {
            ConfigError::EndBeforeStart {
                start: fiscal::format_date(start_date),
                end: fiscal::format_date(end_date),
            }
        })?;

        if report_type == ReportType::Sales && dates.len() > cfg.limits.maximum_interval_days {
            return Err(ConfigError::IntervalTooLarge {
                got: dates.len(),
                max: cfg.limits.maximum_interval_days,
            });
        }

        let current_year = today.year();
        let periods = fiscal::periods_for_range(
            current_year,
            current_year + 1,
            &dates,
            cfg.fiscal.initial_period,
        );

        Ok(RunConfig {
            access_token: params.access_token.clone(),
            account: params.account.trim().to_string(),
            report_type,
            vendors,
            start_date,
            end_date,
            dates,
            periods,
            regions: FINANCE_REGIONS.iter().map(|r| r.to_string()).collect(),
            file_name: format!("{}.csv", report_type.as_str()),
        })
    }
}

fn parse_vendors(raw: Option<&toml::Value>) -> Result<Vec<String>, ConfigError> {
    let value = raw.ok_or(ConfigError::MissingVendors)?;
    let items = match value {
        toml::Value::Array(items) => items,
        _ => return Err(ConfigError::VendorsNotArray),
    };
    if items.is_empty() {
        return Err(ConfigError::MissingVendors);
    }
    let mut vendors = Vec::with_capacity(items.len());
    for item in items {
        match item {
            toml::Value::String(s) if !s.trim().is_empty() => vendors.push(s.trim().to_string()),
            toml::Value::Integer(n) => vendors.push(n.to_string()),
            _ => return Err(ConfigError::VendorsNotArray),
        }
    }
    Ok(vendors)
}
