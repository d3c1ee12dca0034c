//! CLI entry point for the weekly SEO report.
//!
//! Provides subcommands for running the full weekly report against the
//! Google APIs, comparing two CSV exports offline, and uploading a finished
//! report folder to S3.

mod infra;

use crate::infra::google::{AnalyticsClient, SearchConsoleClient, token};
use crate::infra::s3::S3Sink;
use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use weekly_seo_report::analyzers::aggregate::summarize;
use weekly_seo_report::analyzers::compare::compare;
use weekly_seo_report::analyzers::rank::top_n;
use weekly_seo_report::config::ReportConfig;
use weekly_seo_report::dataset::Dataset;
use weekly_seo_report::fetch::BasicClient;
use weekly_seo_report::fetch::auth::ApiKey;
use weekly_seo_report::output::{print_json, print_pretty, write_comparison_csv};
use weekly_seo_report::pipeline::run_report;
use weekly_seo_report::services::UploadSink;

#[derive(Parser)]
#[command(name = "weekly_seo_report")]
#[command(about = "Week-over-week search and traffic report", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the last two complete weeks and write the report
    Report {
        /// JSON config file (defaults are used when it does not exist)
        #[arg(short, long, default_value = "config/report.json")]
        config: PathBuf,

        /// Run date as YYYY-MM-DD (defaults to today, UTC)
        #[arg(short, long)]
        date: Option<String>,

        /// Optional: S3 bucket to upload the report folder to
        #[arg(long)]
        s3_bucket: Option<String>,

        /// Optional: Gzip compress files before uploading to S3
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Compare two CSV exports offline
    Compare {
        /// CSV for the current week
        #[arg(long)]
        current: String,

        /// CSV for the prior week
        #[arg(long)]
        prior: String,

        /// Join column
        #[arg(short, long)]
        key: String,

        /// Metric column to compare (repeatable)
        #[arg(short, long = "metric", required = true)]
        metrics: Vec<String>,

        /// Number of top current-week rows to log
        #[arg(short, long, default_value_t = 10)]
        top: usize,

        /// CSV file for the comparison records (logged as JSON when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Upload a report folder to S3
    Upload {
        /// Local folder to upload
        #[arg(short, long)]
        folder: PathBuf,

        /// S3 bucket name (e.g., "my-bucket")
        #[arg(long)]
        s3_bucket: String,

        /// Key prefix in front of the folder name
        #[arg(short, long, default_value = "")]
        prefix: String,

        /// Gzip compress files before uploading
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/weekly_seo_report.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("weekly_seo_report.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            config,
            date,
            s3_bucket,
            gzip,
        } => {
            report(&config, date.as_deref(), s3_bucket, gzip).await?;
        }
        Commands::Compare {
            current,
            prior,
            key,
            metrics,
            top,
            output,
        } => {
            compare_files(&current, &prior, &key, &metrics, top, output.as_deref())?;
        }
        Commands::Upload {
            folder,
            s3_bucket,
            prefix,
            gzip,
        } => {
            let sink = S3Sink::from_env(s3_bucket, prefix, gzip).await;
            let remote = sink.upload_folder(&folder).await?;
            info!(remote = %remote, "Folder uploaded");
        }
    }

    Ok(())
}

fn parse_run_date(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("Invalid --date '{s}', expected YYYY-MM-DD")),
        None => Ok(Utc::now().date_naive()),
    }
}

/// Runs the weekly report against Search Console and Analytics 4.
#[tracing::instrument(skip(s3_bucket), fields(config = %config_path.display()))]
async fn report(
    config_path: &Path,
    date: Option<&str>,
    s3_bucket: Option<String>,
    gzip: bool,
) -> Result<()> {
    let config = ReportConfig::load_or_default(config_path)?.with_env_overrides();
    config.validate()?;
    if config.site_url.is_empty() {
        bail!("No site URL configured: set site_url in the config or SEO_SITE_URL");
    }
    if config.ga4_property_id.is_empty() {
        bail!("No GA4 property configured: set ga4_property_id in the config or GA4_PROPERTY_ID");
    }

    let today = parse_run_date(date)?;
    let access_token = token::access_token_from_env().await?;

    let search = SearchConsoleClient::new(
        ApiKey::bearer(BasicClient::new()?, &access_token)?,
        config.site_url.clone(),
        config.search.row_limit,
    );
    let traffic = AnalyticsClient::new(
        ApiKey::bearer(BasicClient::new()?, &access_token)?,
        config.ga4_property_id.clone(),
        config.traffic.row_limit,
    );

    // CLI flag wins over the config file
    let bucket = s3_bucket.or_else(|| {
        config
            .upload
            .enabled
            .then(|| config.upload.bucket.clone())
            .flatten()
    });
    if config.upload.enabled && bucket.is_none() {
        warn!("Upload enabled but no bucket configured, skipping upload");
    }

    let sink = match bucket {
        Some(bucket) => {
            info!(bucket = %bucket, "S3 upload enabled");
            Some(S3Sink::from_env(bucket, config.upload.prefix.clone(), gzip || config.upload.gzip).await)
        }
        None => None,
    };

    let artifacts = run_report(
        &config,
        &search,
        &traffic,
        sink.as_ref().map(|s| s as &dyn UploadSink),
        today,
    )
    .await?;

    info!(
        folder = %artifacts.folder.display(),
        html = %artifacts.html_path.display(),
        remote = artifacts.remote_folder.as_deref().unwrap_or("-"),
        "Weekly report complete"
    );
    println!("{}", artifacts.summary);

    Ok(())
}

/// Compares two CSV exports and writes or logs the records.
#[tracing::instrument(skip(metrics, output))]
fn compare_files(
    current_path: &str,
    prior_path: &str,
    key: &str,
    metrics: &[String],
    top: usize,
    output: Option<&Path>,
) -> Result<()> {
    let current = Dataset::from_csv_path(current_path)?;
    let prior = Dataset::from_csv_path(prior_path)?;
    info!(current = current.len(), prior = prior.len(), "Datasets loaded");

    let records = compare(&current, &prior, key, metrics)?;
    let stats = summarize(&current, &prior, metrics)?;
    print_pretty(&stats);

    for (metric, change) in &stats {
        info!(
            metric = %metric,
            this_week = change.this_week,
            last_week = change.last_week,
            delta = change.delta,
            change_pct = %format!("{:+.1}", change.change_pct),
            "Summary"
        );
    }

    if let Some(first) = metrics.first() {
        for (rank, row) in top_n(&current, first, top)?.iter().enumerate() {
            let label = row.get(key).map(|v| v.to_string()).unwrap_or_default();
            let value = row.get(first).and_then(|v| v.as_f64()).unwrap_or(0.0);
            info!(rank = rank + 1, key = %label, value, "Top row");
        }
    }

    match output {
        Some(path) => {
            write_comparison_csv(path, key, metrics, &records)?;
            info!(path = %path.display(), records = records.len(), "Comparison written");
        }
        None => print_json(&records)?,
    }

    Ok(())
}
