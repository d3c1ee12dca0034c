//! Report configuration.
//!
//! Stored as a JSON object on disk; every field has a default so a partial
//! (or missing) file still yields a usable configuration:
//! ```json
//! {
//!   "site_url": "https://example.com/",
//!   "ga4_property_id": "123456789",
//!   "output_dir": "reports/weekly",
//!   "upload": { "enabled": true, "bucket": "my-reports" }
//! }
//! ```

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub site_url: String,

    #[serde(default)]
    pub ga4_property_id: String,

    /// Search Console query settings.
    #[serde(default = "SourceConfig::search")]
    pub search: SourceConfig,

    /// Analytics 4 report settings.
    #[serde(default = "SourceConfig::traffic")]
    pub traffic: SourceConfig,

    /// Root folder; each run writes into a dated subfolder.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    #[serde(default)]
    pub report: PageConfig,

    #[serde(default)]
    pub upload: UploadConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            site_url: String::new(),
            ga4_property_id: String::new(),
            search: SourceConfig::search(),
            traffic: SourceConfig::traffic(),
            output_dir: default_output_dir(),
            report: PageConfig::default(),
            upload: UploadConfig::default(),
        }
    }
}

fn default_output_dir() -> String {
    "reports/weekly".to_string()
}

/// Query shape and ranking sizes for one metrics source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Dimensions requested from the API. The first one is the join key.
    pub dimensions: Vec<String>,
    pub metrics: Vec<String>,
    /// Metric used for top rows and movers.
    pub rank_metric: String,
    #[serde(default = "default_row_limit")]
    pub row_limit: usize,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_movers_n")]
    pub movers_n: usize,
}

fn default_row_limit() -> usize {
    1000
}

fn default_top_n() -> usize {
    20
}

fn default_movers_n() -> usize {
    10
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl SourceConfig {
    pub fn search() -> Self {
        Self {
            dimensions: strings(&["query"]),
            metrics: strings(&["clicks", "impressions", "ctr", "position"]),
            rank_metric: "clicks".to_string(),
            row_limit: default_row_limit(),
            top_n: default_top_n(),
            movers_n: default_movers_n(),
        }
    }

    pub fn traffic() -> Self {
        Self {
            dimensions: strings(&["sessionDefaultChannelGroup"]),
            metrics: strings(&["sessions", "totalUsers", "screenPageViews"]),
            rank_metric: "sessions".to_string(),
            row_limit: default_row_limit(),
            top_n: default_top_n(),
            movers_n: default_movers_n(),
        }
    }

    /// Join column: the first requested dimension.
    pub fn key_column(&self) -> &str {
        self.dimensions.first().map(String::as_str).unwrap_or_default()
    }
}

/// Titles for the HTML page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_subtitle")]
    pub subtitle: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            subtitle: default_subtitle(),
        }
    }
}

fn default_title() -> String {
    "Weekly SEO Report".to_string()
}

fn default_subtitle() -> String {
    "Search performance analysis".to_string()
}

/// Cloud upload of the dated output folder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub gzip: bool,
}

impl ReportConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: ReportConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise falls back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            info!(path = %path.display(), "Loading report config");
            Self::load(path)
        } else {
            debug!(path = %path.display(), "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Applies `SEO_SITE_URL` and `GA4_PROPERTY_ID` when set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("SEO_SITE_URL") {
            self.site_url = url;
        }
        if let Ok(id) = std::env::var("GA4_PROPERTY_ID") {
            self.ga4_property_id = id;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, source) in [("search", &self.search), ("traffic", &self.traffic)] {
            if source.dimensions.is_empty() {
                bail!("{name}.dimensions must name at least one dimension");
            }
            if source.metrics.is_empty() {
                bail!("{name}.metrics must name at least one metric");
            }
            if !source.metrics.contains(&source.rank_metric) {
                bail!(
                    "{name}.rank_metric '{}' is not one of the requested metrics",
                    source.rank_metric
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReportConfig::default();
        assert_eq!(config.search.key_column(), "query");
        assert_eq!(config.traffic.key_column(), "sessionDefaultChannelGroup");
        assert_eq!(config.search.top_n, 20);
        assert_eq!(config.search.movers_n, 10);
        assert_eq!(config.output_dir, "reports/weekly");
        assert!(!config.upload.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{ "site_url": "https://example.com/", "upload": { "enabled": true, "bucket": "b" } }"#;
        let config: ReportConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.site_url, "https://example.com/");
        assert_eq!(config.search.metrics.len(), 4);
        assert_eq!(config.traffic.rank_metric, "sessions");
        assert!(config.upload.enabled);
        assert_eq!(config.upload.bucket.as_deref(), Some("b"));
        assert_eq!(config.report.title, "Weekly SEO Report");
    }

    #[test]
    fn test_validate_rejects_unknown_rank_metric() {
        let mut config = ReportConfig::default();
        config.search.rank_metric = "revenue".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("weekly_seo_report_no_such_config.json");
        let _ = std::fs::remove_file(&path);
        let config = ReportConfig::load_or_default(&path).unwrap();
        assert_eq!(config.search.row_limit, 1000);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("weekly_seo_report_test_config.json");
        std::fs::write(&path, r#"{ "output_dir": "out", "search": { "dimensions": ["query"], "metrics": ["clicks"], "rank_metric": "clicks", "top_n": 5 } }"#).unwrap();
        let config = ReportConfig::load(&path).unwrap();
        assert_eq!(config.output_dir, "out");
        assert_eq!(config.search.top_n, 5);
        assert_eq!(config.search.row_limit, 1000);
        std::fs::remove_file(&path).unwrap();
    }
}
