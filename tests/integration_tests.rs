use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use weekly_seo_report::analyzers::aggregate::summarize;
use weekly_seo_report::analyzers::analyzer::analyze;
use weekly_seo_report::analyzers::compare::compare;
use weekly_seo_report::config::{ReportConfig, SourceConfig};
use weekly_seo_report::dataset::{Dataset, Value, row};
use weekly_seo_report::narrative::build_summary;
use weekly_seo_report::output::write_comparison_csv;
use weekly_seo_report::pipeline::run_report;
use weekly_seo_report::services::{MetricsSource, UploadSink};
use weekly_seo_report::window::ReportWindow;

fn fixture(csv: &str) -> Dataset {
    Dataset::from_csv_reader(csv.as_bytes()).expect("Failed to parse fixture")
}

fn search_current() -> Dataset {
    fixture(include_str!("fixtures/search_current.csv"))
}

fn search_prior() -> Dataset {
    fixture(include_str!("fixtures/search_prior.csv"))
}

fn traffic_current() -> Dataset {
    fixture(include_str!("fixtures/traffic_current.csv"))
}

fn traffic_prior() -> Dataset {
    fixture(include_str!("fixtures/traffic_prior.csv"))
}

/// Serves one dataset for the window starting at `current_start` and another
/// for every other window.
struct FakeSource {
    name: &'static str,
    current_start: NaiveDate,
    current: Dataset,
    prior: Dataset,
    requested: Mutex<Vec<ReportWindow>>,
}

impl FakeSource {
    fn new(name: &'static str, current_start: NaiveDate, current: Dataset, prior: Dataset) -> Self {
        Self {
            name,
            current_start,
            current,
            prior,
            requested: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl MetricsSource for FakeSource {
    fn name(&self) -> &str {
        self.name
    }

    async fn fetch_window(
        &self,
        window: &ReportWindow,
        _dimensions: &[String],
        _metrics: &[String],
    ) -> Result<Dataset> {
        self.requested.lock().unwrap().push(*window);
        if window.start == self.current_start {
            Ok(self.current.clone())
        } else {
            Ok(self.prior.clone())
        }
    }
}

#[derive(Default)]
struct FakeSink {
    uploaded: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl UploadSink for FakeSink {
    async fn upload_folder(&self, local_path: &Path) -> Result<String> {
        self.uploaded.lock().unwrap().push(local_path.to_path_buf());
        Ok(format!("fake://reports/{}/", local_path.display()))
    }
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn config_in(dir: &str) -> ReportConfig {
    let output = std::env::temp_dir().join(dir);
    let _ = std::fs::remove_dir_all(&output);
    ReportConfig {
        output_dir: output.to_string_lossy().into_owned(),
        ..ReportConfig::default()
    }
}

#[test]
fn test_compare_csv_exports() {
    let metrics = vec!["clicks".to_string(), "impressions".to_string()];
    let records = compare(&search_current(), &search_prior(), "query", &metrics).unwrap();

    let keys: Vec<_> = records.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(
        keys,
        vec!["rust tutorial", "rust async", "cargo workspaces", "new query", "old query"]
    );

    let fresh = records[3].metric("clicks").unwrap();
    assert_eq!(fresh.last_week, 0.0);
    assert_eq!(fresh.change_pct, 100.0);

    let gone = records[4].metric("clicks").unwrap();
    assert_eq!(gone.this_week, 0.0);
    assert_eq!(gone.change_pct, -100.0);

    let stats = summarize(&search_current(), &search_prior(), &metrics).unwrap();
    assert_eq!(stats["clicks"].this_week, 1000.0);
    assert_eq!(stats["clicks"].last_week, 930.0);
    assert_eq!(stats["clicks"].delta, 70.0);
}

#[test]
fn test_numeric_looking_queries_keep_their_text() {
    let current = fixture(include_str!("fixtures/numeric_keys_current.csv"));
    let prior = fixture(include_str!("fixtures/numeric_keys_prior.csv"));
    let metrics = vec!["clicks".to_string()];

    let records = compare(&current, &prior, "query", &metrics).unwrap();
    let keys: Vec<_> = records.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["404", "2024", "007", "1e3", "7", "1000"]);

    let path = std::env::temp_dir().join("weekly_seo_report_it_numeric_keys.csv");
    write_comparison_csv(&path, "query", &metrics, &records).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = written.lines().collect();
    assert_eq!(
        lines,
        vec![
            "query,clicks_this_week,clicks_last_week,clicks_delta,clicks_change_pct",
            "404,10,8,2,25",
            "2024,5,0,5,100",
            "007,3,0,3,100",
            "1e3,2,0,2,100",
            "7,0,4,-4,-100",
            "1000,0,1,-1,-100",
        ]
    );

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_summary_from_csv_exports() {
    let search = analyze(&search_current(), &search_prior(), &SourceConfig::search()).unwrap();
    let traffic = analyze(&traffic_current(), &traffic_prior(), &SourceConfig::traffic()).unwrap();

    let summary = build_summary(&search, &traffic);

    assert!(summary.contains("📈 **Search clicks**: 1,000 (WoW +7.5%)"));
    // position rose, which is a worse rank
    assert!(summary.contains("⬇️ **Average position**: 24.7 (WoW +6.0%)"));
    assert!(summary.contains("💡 **Top query**: \"rust tutorial\" (500 clicks)"));
    assert!(summary.contains("🚀 **Fastest-growing query**: \"rust tutorial\" (+100 clicks)"));
    assert!(summary.contains("⚠️ **Biggest query decline**: \"old query\" (-60 clicks)"));
    assert!(summary.contains("📊 **Total sessions**: 2,320 (WoW +5.5%)"));
    assert!(summary.contains("🌿 **Organic search sessions**: 1,520 (WoW +16.9%)"));

    let caution = summary.find("🟡 **Caution**: Average position slipped").unwrap();
    let opportunity = summary.find("💡 **Opportunity**: Expand content").unwrap();
    assert!(caution < opportunity);
    assert!(!summary.contains("🔴"));
    assert!(!summary.contains("✅ **Stable**"));
}

#[tokio::test]
async fn test_full_pipeline() {
    let run_date = date("2026-10-14");
    let current_start = date("2026-10-05");
    let config = config_in("weekly_seo_report_it_pipeline");

    let search = FakeSource::new("search", current_start, search_current(), search_prior());
    let traffic = FakeSource::new("traffic", current_start, traffic_current(), traffic_prior());
    let sink = FakeSink::default();

    let artifacts = run_report(&config, &search, &traffic, Some(&sink as &dyn UploadSink), run_date)
        .await
        .expect("Report run failed");

    let requested = search.requested.lock().unwrap().clone();
    assert_eq!(requested.len(), 2);
    assert_eq!(requested[0].to_string(), "2026-10-05..2026-10-11");
    assert_eq!(requested[1].to_string(), "2026-09-28..2026-10-04");

    assert!(artifacts.folder.ends_with("2026-10-14"));
    for name in [
        "analysis_2026-10-14.json",
        "search_comparison_2026-10-14.csv",
        "traffic_comparison_2026-10-14.csv",
        "chart_clicks_trend_2026-10-14.csv",
        "chart_ctr_comparison_2026-10-14.csv",
        "chart_channel_sessions_2026-10-14.csv",
        "chart_top_queries_2026-10-14.csv",
        "summary_2026-10-14.md",
        "weekly_report_2026-10-14.html",
    ] {
        assert!(artifacts.folder.join(name).is_file(), "missing {name}");
    }

    let summary_md =
        std::fs::read_to_string(artifacts.folder.join("summary_2026-10-14.md")).unwrap();
    assert_eq!(summary_md, artifacts.summary);

    let analysis: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(artifacts.folder.join("analysis_2026-10-14.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(analysis["windows"]["current"]["start"], "2026-10-05");
    assert_eq!(analysis["search"]["summary_stats"]["clicks"]["this_week"], 1000.0);
    assert_eq!(analysis["traffic"]["key_column"], "sessionDefaultChannelGroup");

    let comparison =
        std::fs::read_to_string(artifacts.folder.join("search_comparison_2026-10-14.csv")).unwrap();
    assert_eq!(comparison.lines().count(), 6);
    assert!(comparison.starts_with("query,clicks_this_week,clicks_last_week,clicks_delta,clicks_change_pct"));

    let html = std::fs::read_to_string(&artifacts.html_path).unwrap();
    assert!(html.contains("<strong>Search clicks</strong>: 1,000"));

    assert_eq!(sink.uploaded.lock().unwrap().as_slice(), &[artifacts.folder.clone()]);
    assert!(artifacts.remote_folder.unwrap().starts_with("fake://reports/"));

    std::fs::remove_dir_all(&config.output_dir).unwrap();
}

#[tokio::test]
async fn test_empty_current_week_reports_absence() {
    let run_date = date("2026-10-14");
    let config = config_in("weekly_seo_report_it_empty");

    let search = FakeSource::new("search", date("2026-10-05"), Dataset::empty(), search_prior());
    let traffic = FakeSource::new("traffic", date("2026-10-05"), Dataset::empty(), traffic_prior());

    let artifacts = run_report(&config, &search, &traffic, None, run_date)
        .await
        .expect("Empty week should not fail the run");

    assert!(artifacts.summary.contains("ℹ️ **Top query**: no query data for this week"));
    assert!(artifacts.summary.contains("📉 **Search clicks**: 0 (WoW -100.0%)"));
    assert!(artifacts.remote_folder.is_none());

    std::fs::remove_dir_all(&config.output_dir).unwrap();
}

#[tokio::test]
async fn test_missing_metric_column_aborts_run() {
    let run_date = date("2026-10-14");
    let config = config_in("weekly_seo_report_it_missing");

    let without_ctr: Dataset = vec![row([
        ("query", Value::from("rust")),
        ("clicks", Value::from(10.0)),
        ("impressions", Value::from(100.0)),
        ("position", Value::from(3.0)),
    ])]
    .into_iter()
    .collect();

    let search = FakeSource::new("search", date("2026-10-05"), without_ctr.clone(), without_ctr);
    let traffic = FakeSource::new("traffic", date("2026-10-05"), traffic_current(), traffic_prior());

    let err = run_report(&config, &search, &traffic, None, run_date)
        .await
        .unwrap_err();

    let message = format!("{:#}", err);
    assert!(message.contains("search analysis failed"));
    assert!(message.contains("missing column 'ctr' in current dataset"));
    assert!(!Path::new(&config.output_dir).join("2026-10-14").exists());
}
