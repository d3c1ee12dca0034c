//! One weekly report run: fetch, analyze, summarize, write, upload.

use crate::analyzers::analyzer::analyze;
use crate::analyzers::types::AnalysisBundle;
use crate::config::{ReportConfig, SourceConfig};
use crate::dataset::Dataset;
use crate::narrative::build_summary;
use crate::output::{write_comparison_csv, write_json, write_serialized_csv};
use crate::report::charts::build_charts;
use crate::report::html::{ReportPage, render_report};
use crate::services::{MetricsSource, UploadSink};
use crate::window::{ReportWindow, WindowPair};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Bars shown in the top-queries chart.
const TOP_QUERIES_CHART: usize = 10;

/// What a run produced.
#[derive(Debug)]
pub struct ReportArtifacts {
    pub folder: PathBuf,
    pub html_path: PathBuf,
    pub summary: String,
    pub remote_folder: Option<String>,
}

/// Machine-readable record of a run, written as `analysis_<date>.json`.
#[derive(Serialize)]
struct AnalysisDocument<'a> {
    generated_at: DateTime<Utc>,
    windows: WindowPair,
    search: &'a AnalysisBundle,
    traffic: &'a AnalysisBundle,
    summary: &'a str,
}

async fn fetch_window(
    source: &dyn MetricsSource,
    window: &ReportWindow,
    source_config: &SourceConfig,
) -> Result<Dataset> {
    let dataset = source
        .fetch_window(window, &source_config.dimensions, &source_config.metrics)
        .await
        .with_context(|| format!("{} fetch failed for {}", source.name(), window))?;

    if dataset.is_empty() {
        warn!(source = source.name(), window = %window, "No rows returned for window");
    } else {
        info!(source = source.name(), window = %window, rows = dataset.len(), "Window fetched");
    }

    Ok(dataset)
}

/// Fetches both windows from `source` and analyzes them.
pub async fn analyze_source(
    source: &dyn MetricsSource,
    windows: &WindowPair,
    source_config: &SourceConfig,
) -> Result<AnalysisBundle> {
    let current = fetch_window(source, &windows.current, source_config).await?;
    let prior = fetch_window(source, &windows.prior, source_config).await?;

    analyze(&current, &prior, source_config).with_context(|| format!("{} analysis failed", source.name()))
}

/// Writes every artifact of the run into `<output_dir>/<date>/`.
///
/// Existing files with the same names are replaced.
pub fn write_artifacts(
    config: &ReportConfig,
    today: NaiveDate,
    windows: &WindowPair,
    search: &AnalysisBundle,
    traffic: &AnalysisBundle,
    summary: &str,
) -> Result<(PathBuf, PathBuf)> {
    let date = today.format("%Y-%m-%d").to_string();
    let folder = Path::new(&config.output_dir).join(&date);
    std::fs::create_dir_all(&folder)
        .with_context(|| format!("Failed to create output folder {}", folder.display()))?;

    write_json(
        &folder.join(format!("analysis_{date}.json")),
        &AnalysisDocument {
            generated_at: Utc::now(),
            windows: *windows,
            search,
            traffic,
            summary,
        },
    )?;

    write_comparison_csv(
        &folder.join(format!("search_comparison_{date}.csv")),
        &search.key_column,
        &config.search.metrics,
        &search.comparison_records,
    )?;
    write_comparison_csv(
        &folder.join(format!("traffic_comparison_{date}.csv")),
        &traffic.key_column,
        &config.traffic.metrics,
        &traffic.comparison_records,
    )?;

    let charts = build_charts(search, traffic, TOP_QUERIES_CHART);
    for chart in &charts {
        write_serialized_csv(
            &folder.join(format!("chart_{}_{date}.csv", chart.slug)),
            &chart.points,
        )?;
    }

    std::fs::write(folder.join(format!("summary_{date}.md")), summary)?;

    let html = render_report(&ReportPage {
        page: &config.report,
        report_date: today,
        summary_markdown: summary,
        charts: &charts,
        top_key_column: &search.key_column,
        top_rows: &search.top_rows,
    });
    let html_path = folder.join(format!("weekly_report_{date}.html"));
    std::fs::write(&html_path, html)
        .with_context(|| format!("Failed to write {}", html_path.display()))?;

    info!(folder = %folder.display(), charts = charts.len(), "Artifacts written");
    Ok((folder, html_path))
}

/// Runs the full weekly report for the week before `today`.
#[tracing::instrument(skip_all, fields(date = %today))]
pub async fn run_report(
    config: &ReportConfig,
    search_source: &dyn MetricsSource,
    traffic_source: &dyn MetricsSource,
    sink: Option<&dyn UploadSink>,
    today: NaiveDate,
) -> Result<ReportArtifacts> {
    let windows = WindowPair::for_run_date(today);
    info!(current = %windows.current, prior = %windows.prior, "Report windows");

    let search = analyze_source(search_source, &windows, &config.search).await?;
    let traffic = analyze_source(traffic_source, &windows, &config.traffic).await?;

    let summary = build_summary(&search, &traffic);
    let (folder, html_path) =
        write_artifacts(config, today, &windows, &search, &traffic, &summary)?;

    let remote_folder = match sink {
        Some(sink) => {
            let id = sink
                .upload_folder(&folder)
                .await
                .with_context(|| format!("Upload of {} failed", folder.display()))?;
            info!(remote = %id, "Report uploaded");
            Some(id)
        }
        None => None,
    };

    Ok(ReportArtifacts {
        folder,
        html_path,
        summary,
        remote_folder,
    })
}
