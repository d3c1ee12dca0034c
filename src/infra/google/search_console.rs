use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;
use serde_json::Value as Json;
use weekly_seo_report::dataset::{Dataset, Row, Value};
use weekly_seo_report::fetch::{HttpClient, post_json};
use weekly_seo_report::services::MetricsSource;
use weekly_seo_report::window::ReportWindow;

const API_BASE: &str = "https://www.googleapis.com/webmasters/v3/sites/";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    start_date: String,
    end_date: String,
    dimensions: &'a [String],
    row_limit: usize,
    start_row: usize,
}

/// Search Analytics queries for one verified site.
pub struct SearchConsoleClient<C> {
    client: C,
    site_url: String,
    row_limit: usize,
}

impl<C: HttpClient> SearchConsoleClient<C> {
    pub fn new(client: C, site_url: impl Into<String>, row_limit: usize) -> Self {
        Self {
            client,
            site_url: site_url.into(),
            row_limit,
        }
    }

    fn query_url(&self) -> Result<Url> {
        let mut url = Url::parse(API_BASE)?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Search Console base URL cannot take path segments"))?
            .pop_if_empty()
            .push(&self.site_url)
            .push("searchAnalytics")
            .push("query");
        Ok(url)
    }
}

/// Maps a Search Analytics response onto rows keyed by dimension and metric name.
///
/// `keys[i]` holds the value of `dimensions[i]`. A response without `rows`
/// means no data for the range.
pub fn parse_rows(body: &Json, dimensions: &[String], metrics: &[String]) -> Dataset {
    let Some(rows) = body["rows"].as_array() else {
        return Dataset::empty();
    };

    rows.iter()
        .map(|item| {
            let mut row = Row::new();
            for (i, dimension) in dimensions.iter().enumerate() {
                let key = item["keys"][i].as_str().unwrap_or_default();
                row.insert(dimension.clone(), Value::from(key));
            }
            for metric in metrics {
                if let Some(n) = item[metric.as_str()].as_f64() {
                    row.insert(metric.clone(), Value::Number(n));
                }
            }
            row
        })
        .collect()
}

#[async_trait]
impl<C: HttpClient> MetricsSource for SearchConsoleClient<C> {
    fn name(&self) -> &str {
        "search_console"
    }

    #[tracing::instrument(skip_all, fields(site = %self.site_url, window = %window))]
    async fn fetch_window(
        &self,
        window: &ReportWindow,
        dimensions: &[String],
        metrics: &[String],
    ) -> Result<Dataset> {
        let body = QueryRequest {
            start_date: window.start_str(),
            end_date: window.end_str(),
            dimensions,
            row_limit: self.row_limit,
            start_row: 0,
        };

        let response = post_json(&self.client, self.query_url()?, &body).await?;
        Ok(parse_rows(&response, dimensions, metrics))
    }
}
