use crate::{
    config::{Config, RunConfig},
    jobs,
    pipeline::Pipeline,
    service::HttpReportService,
    util::{ensure_dir, sha256_hex},
};
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "vendorpull")]
#[command(about = "Vendor report extractor (fiscal periods + bounded-retry acquisition + consolidation)")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./vendorpull.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate the configuration and print the resolved run parameters.
    Validate {},
    /// Print the concrete fetch-job list the configuration expands to.
    Plan {},
    /// Run the full extraction.
    Run {
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref())?;
    let cfg = Config::load(&cfg_path)?;

    match &args.cmd {
        Command::Validate {} => {
            let _guard = init_logging(&args, &cfg, resolve_log_path(&cfg, None).as_deref())?;
            validate(&cfg)
        }
        Command::Plan {} => {
            let _guard = init_logging(&args, &cfg, resolve_log_path(&cfg, None).as_deref())?;
            plan(&cfg)
        }
        Command::Run { out_dir } => run(&args, &cfg, out_dir.as_deref()),
    }
}

fn resolve_config_path(user: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = user {
        return Ok(p.to_path_buf());
    }
    let default = PathBuf::from("vendorpull.toml");
    if default.exists() {
        Ok(default)
    } else {
        Ok(PathBuf::from("vendorpull.example.toml"))
    }
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn today_utc() -> time::Date {
    OffsetDateTime::now_utc().date()
}

fn resolve_run(cfg: &Config) -> Result<RunConfig> {
    RunConfig::from_config(cfg, today_utc()).context("problem in the input configuration")
}

fn validate(cfg: &Config) -> Result<()> {
    let run = resolve_run(cfg)?;
    println!("{}", serde_json::to_string_pretty(&run)?);
    Ok(())
}

fn plan(cfg: &Config) -> Result<()> {
    let run = resolve_run(cfg)?;
    let job_list = jobs::expand(&run);
    println!("{}", serde_json::to_string_pretty(&job_list)?);
    Ok(())
}

fn run(args: &Args, cfg: &Config, out_override: Option<&Path>) -> Result<()> {
    let run_cfg = resolve_run(cfg)?;

    let cfg_hash = sha256_hex(cfg.normalized_for_hash().as_bytes());
    let run_id = sha256_hex(
        format!(
            "{}:{}:{}",
            cfg_hash,
            crate::fiscal::format_date(run_cfg.start_date),
            crate::fiscal::format_date(run_cfg.end_date)
        )
        .as_bytes(),
    );

    let out_root = out_override
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.paths.out_dir));
    ensure_dir(&out_root)?;

    let log_path = resolve_log_path(cfg, Some(&out_root));
    let _guard = init_logging(args, cfg, log_path.as_deref())?;

    info!(
        "run_id={run_id} report_type={} range={}..{} out={}",
        run_cfg.report_type,
        crate::fiscal::format_date(run_cfg.start_date),
        crate::fiscal::format_date(run_cfg.end_date),
        out_root.display()
    );

    if cfg.debug.dump_effective_config {
        std::fs::write(out_root.join("effective-config.toml"), cfg.redacted_toml())?;
    }

    // Fresh per-run working directory; deleted below regardless of outcome.
    let workdir = PathBuf::from(&cfg.paths.work_dir).join(&run_id);
    ensure_dir(&workdir)?;

    let service = HttpReportService::new(cfg, &run_cfg.access_token, &run_cfg.account)
        .map_err(|e| anyhow!("{e}"))?;
    let pipeline = Pipeline::new(cfg, &run_cfg, service);

    let result = pipeline.execute(&run_id, &workdir, &out_root);

    if let Err(e) = std::fs::remove_dir_all(&workdir) {
        warn!("could not remove working directory {}: {e}", workdir.display());
    }

    let output = result?;

    if cfg.output.write_report_json {
        std::fs::write(
            out_root.join(&cfg.output.report_filename),
            serde_json::to_string_pretty(&output.report)?,
        )?;
    }

    if cfg.output.print_summary {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "run_id": run_id,
                "dataset": output.dataset_path,
                "manifest": output.manifest_path,
                "rows_written": output.report.rows_written,
                "jobs_failed": output.report.jobs_failed,
                "status": "ok"
            }))?
        );
    }

    Ok(())
}

fn resolve_log_path(cfg: &Config, out_dir: Option<&Path>) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }

    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }

    if let Some(out_dir) = out_dir {
        return Some(out_dir.join("logs").join("vendorpull.log"));
    }

    Some(PathBuf::from(&cfg.paths.out_dir).join("vendorpull.log"))
}
