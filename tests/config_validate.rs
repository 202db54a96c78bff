use time::macros::date;
use vendorpull::config::{Config, ConfigError, RunConfig};
use vendorpull::schema::ReportType;

const TODAY: time::Date = date!(2024 - 06 - 15);

fn base_config() -> Config {
    let mut cfg = Config::default();
    cfg.parameters.access_token = "token".into();
    cfg.parameters.report_type = "sales".into();
    cfg.parameters.account = "1234".into();
    cfg.parameters.vendors = Some(toml::Value::Array(vec![toml::Value::String(
        "80012345".into(),
    )]));
    cfg.parameters.start_date = "20240501".into();
    cfg.parameters.end_date = "20240510".into();
    cfg
}

#[test]
fn valid_config_resolves() {
    let run = RunConfig::from_config(&base_config(), TODAY).unwrap();
    assert_eq!(run.report_type, ReportType::Sales);
    assert_eq!(run.dates.len(), 10);
    assert_eq!(run.file_name, "sales.csv");
    assert_eq!(run.vendors, vec!["80012345".to_string()]);
}

#[test]
fn missing_access_token_is_rejected() {
    let mut cfg = base_config();
    cfg.parameters.access_token = "".into();
    let err = RunConfig::from_config(&cfg, TODAY).unwrap_err();
    assert!(matches!(err, ConfigError::MissingAccessToken));
}

#[test]
fn scalar_vendors_is_rejected() {
    let mut cfg = base_config();
    cfg.parameters.vendors = Some(toml::Value::String("80012345".into()));
    let err = RunConfig::from_config(&cfg, TODAY).unwrap_err();
    assert!(matches!(err, ConfigError::VendorsNotArray));
}

#[test]
fn empty_vendor_list_is_rejected() {
    let mut cfg = base_config();
    cfg.parameters.vendors = Some(toml::Value::Array(vec![]));
    let err = RunConfig::from_config(&cfg, TODAY).unwrap_err();
    assert!(matches!(err, ConfigError::MissingVendors));
}

#[test]
fn report_type_is_case_insensitive_and_normalized() {
    let mut cfg = base_config();
    cfg.parameters.report_type = "FiNaNcIaL".into();
    let run = RunConfig::from_config(&cfg, TODAY).unwrap();
    assert_eq!(run.report_type, ReportType::Financial);
    assert_eq!(run.file_name, "financial.csv");
    assert_eq!(run.regions.len(), 24);
}

#[test]
fn unknown_report_type_is_rejected() {
    let mut cfg = base_config();
    cfg.parameters.report_type = "earnings".into();
    let err = RunConfig::from_config(&cfg, TODAY).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownReportType(_)));
}

#[test]
fn bad_date_mask_is_rejected() {
    let mut cfg = base_config();
    cfg.parameters.start_date = "2024-05-01".into();
    let err = RunConfig::from_config(&cfg, TODAY).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::BadDateMask { name: "start_date", .. }
    ));
}

#[test]
fn dates_default_to_lookback_window() {
    let mut cfg = base_config();
    cfg.parameters.start_date = "".into();
    cfg.parameters.end_date = "".into();
    let run = RunConfig::from_config(&cfg, TODAY).unwrap();
    assert_eq!(run.start_date, date!(2024 - 06 - 10));
    assert_eq!(run.end_date, date!(2024 - 06 - 14));
    assert_eq!(run.dates.len(), 5);
}

#[test]
fn end_before_start_is_rejected() {
    let mut cfg = base_config();
    cfg.parameters.start_date = "20240510".into();
    cfg.parameters.end_date = "20240501".into();
    let err = RunConfig::from_config(&cfg, TODAY).unwrap_err();
    assert!(matches!(err, ConfigError::EndBeforeStart { .. }));
}

#[test]
fn equal_start_and_end_is_a_valid_one_day_sales_run() {
    let mut cfg = base_config();
    cfg.parameters.start_date = "20240510".into();
    cfg.parameters.end_date = "20240510".into();
    let run = RunConfig::from_config(&cfg, TODAY).unwrap();
    assert_eq!(run.dates.len(), 1);
}

#[test]
fn end_date_may_not_reach_today() {
    let mut cfg = base_config();
    cfg.parameters.end_date = "20240615".into();
    let err = RunConfig::from_config(&cfg, TODAY).unwrap_err();
    assert!(matches!(err, ConfigError::EndAfterMaximal { .. }));
}

#[test]
fn sixty_day_sales_range_passes_sixty_one_fails() {
    let mut cfg = base_config();
    cfg.parameters.start_date = "20240101".into();
    cfg.parameters.end_date = "20240229".into(); // 60 days in a leap year
    assert!(RunConfig::from_config(&cfg, TODAY).is_ok());

    cfg.parameters.end_date = "20240301".into(); // 61 days
    let err = RunConfig::from_config(&cfg, TODAY).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::IntervalTooLarge { got: 61, max: 60 }
    ));
}

#[test]
fn financial_runs_are_not_capped_by_the_interval() {
    let mut cfg = base_config();
    cfg.parameters.report_type = "financial".into();
    cfg.parameters.start_date = "20240101".into();
    cfg.parameters.end_date = "20240601".into();
    let run = RunConfig::from_config(&cfg, TODAY).unwrap();
    assert!(run.dates.len() > 60);
    assert!(!run.periods.is_empty());
}
