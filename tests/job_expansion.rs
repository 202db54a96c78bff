use time::macros::date;
use vendorpull::config::{Config, RunConfig};
use vendorpull::jobs;

const TODAY: time::Date = date!(2024 - 06 - 15);

fn config(report_type: &str, vendors: &[&str], start: &str, end: &str) -> RunConfig {
    let mut cfg = Config::default();
    cfg.parameters.access_token = "token".into();
    cfg.parameters.report_type = report_type.into();
    cfg.parameters.account = "1234".into();
    cfg.parameters.vendors = Some(toml::Value::Array(
        vendors
            .iter()
            .map(|v| toml::Value::String((*v).into()))
            .collect(),
    ));
    cfg.parameters.start_date = start.into();
    cfg.parameters.end_date = end.into();
    RunConfig::from_config(&cfg, TODAY).unwrap()
}

#[test]
fn sales_expansion_is_vendors_times_dates() {
    let run = config("sales", &["v1", "v2"], "20240501", "20240507");
    let job_list = jobs::expand(&run);
    assert_eq!(job_list.len(), 2 * 7);
}

#[test]
fn financial_expansion_is_vendors_times_regions_times_periods() {
    // Spanning the fiscal rollover yields two periods.
    let run = config("financial", &["v1"], "20230928", "20231003");
    let job_list = jobs::expand(&run);
    assert_eq!(run.periods.len(), 2);
    assert_eq!(job_list.len(), 1 * 24 * 2);
}

#[test]
fn expansion_is_pure_and_order_stable() {
    let run = config("sales", &["v2", "v1"], "20240501", "20240503");
    let a = jobs::expand(&run);
    let b = jobs::expand(&run);
    assert_eq!(a, b);
    // Vendor-major order, as configured.
    assert_eq!(a[0].vendor, "v2");
    assert_eq!(a[3].vendor, "v1");
}

#[test]
fn artifact_names_are_deterministic_and_unique() {
    let run = config("sales", &["v1", "v2"], "20240501", "20240503");
    let job_list = jobs::expand(&run);
    let mut names: Vec<String> = job_list.iter().map(|j| j.artifact_name()).collect();
    assert_eq!(names[0], "sales_v1_20240501.txt.gz");
    names.sort();
    names.dedup();
    assert_eq!(names.len(), job_list.len());
}
