use crate::config::RunConfig;
use crate::fiscal::{self, FiscalPeriod};
use crate::schema::ReportType;
use serde::Serialize;
use time::Date;

/// The dimensional coordinates that make one job unique within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum JobKey {
    Daily { date: Date },
    Periodic { region: String, period: FiscalPeriod },
}

/// One fetchable unit of remote work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportJob {
    pub report_type: ReportType,
    pub vendor: String,
    pub key: JobKey,
}

impl ReportJob {
    /// Deterministic artifact file name derived from job identity, so a
    /// re-run with the same inputs lands on the same paths.
    pub fn artifact_name(&self) -> String {
        match &self.key {
            JobKey::Daily { date } => format!(
                "{}_{}_{}.txt.gz",
                self.report_type,
                self.vendor,
                fiscal::format_date(*date)
            ),
            JobKey::Periodic { region, period } => format!(
                "{}_{}_{}_{}_{:02}.txt.gz",
                self.report_type, self.vendor, region, period.year, period.period
            ),
        }
    }

    pub fn label(&self) -> String {
        match &self.key {
            JobKey::Daily { date } => format!(
                "{} vendor={} date={}",
                self.report_type,
                self.vendor,
                fiscal::format_date(*date)
            ),
            JobKey::Periodic { region, period } => format!(
                "{} vendor={} region={} period={}",
                self.report_type, self.vendor, region, period
            ),
        }
    }
}

/// Expand a validated run configuration into its concrete job list.
///
/// Pure and order-stable: sales = vendors x dates, financial = vendors x
/// regions x fiscal periods. Consolidation later iterates this same order.
pub fn expand(run: &RunConfig) -> Vec<ReportJob> {
    let mut jobs = Vec::new();
    match run.report_type {
        ReportType::Sales => {
            for vendor in &run.vendors {
                for &date in &run.dates {
                    jobs.push(ReportJob {
                        report_type: run.report_type,
                        vendor: vendor.clone(),
                        key: JobKey::Daily { date },
                    });
                }
            }
        }
        ReportType::Financial => {
            for vendor in &run.vendors {
                for region in &run.regions {
                    for &period in &run.periods {
                        jobs.push(ReportJob {
                            report_type: run.report_type,
                            vendor: vendor.clone(),
                            key: JobKey::Periodic {
                                region: region.clone(),
                                period,
                            },
                        });
                    }
                }
            }
        }
    }
    jobs
}
