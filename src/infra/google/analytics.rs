use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;
use serde_json::Value as Json;
use weekly_seo_report::dataset::{Dataset, Row, Value};
use weekly_seo_report::fetch::{HttpClient, post_json};
use weekly_seo_report::services::MetricsSource;
use weekly_seo_report::window::ReportWindow;

const API_BASE: &str = "https://analyticsdata.googleapis.com/v1beta/properties/";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DateRange {
    start_date: String,
    end_date: String,
}

#[derive(Serialize)]
struct Named<'a> {
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunReportRequest<'a> {
    date_ranges: Vec<DateRange>,
    dimensions: Vec<Named<'a>>,
    metrics: Vec<Named<'a>>,
    limit: usize,
}

/// Analytics 4 Data API reports for one property.
pub struct AnalyticsClient<C> {
    client: C,
    property_id: String,
    row_limit: usize,
}

impl<C: HttpClient> AnalyticsClient<C> {
    pub fn new(client: C, property_id: impl Into<String>, row_limit: usize) -> Self {
        Self {
            client,
            property_id: property_id.into(),
            row_limit,
        }
    }

    fn run_report_url(&self) -> Result<Url> {
        Url::parse(&format!("{API_BASE}{}:runReport", self.property_id))
            .map_err(|e| anyhow!("Invalid GA4 property id '{}': {}", self.property_id, e))
    }
}

/// Maps a `runReport` response onto rows.
///
/// Dimension values stay text; metric values arrive as strings and become
/// numbers when they parse.
pub fn parse_rows(body: &Json, dimensions: &[String], metrics: &[String]) -> Dataset {
    let Some(rows) = body["rows"].as_array() else {
        return Dataset::empty();
    };

    rows.iter()
        .map(|item| {
            let mut row = Row::new();
            for (i, dimension) in dimensions.iter().enumerate() {
                let value = item["dimensionValues"][i]["value"].as_str().unwrap_or_default();
                row.insert(dimension.clone(), Value::from(value));
            }
            for (i, metric) in metrics.iter().enumerate() {
                if let Some(raw) = item["metricValues"][i]["value"].as_str() {
                    row.insert(metric.clone(), Value::parse(raw));
                }
            }
            row
        })
        .collect()
}

#[async_trait]
impl<C: HttpClient> MetricsSource for AnalyticsClient<C> {
    fn name(&self) -> &str {
        "analytics"
    }

    #[tracing::instrument(skip_all, fields(property = %self.property_id, window = %window))]
    async fn fetch_window(
        &self,
        window: &ReportWindow,
        dimensions: &[String],
        metrics: &[String],
    ) -> Result<Dataset> {
        let body = RunReportRequest {
            date_ranges: vec![DateRange {
                start_date: window.start_str(),
                end_date: window.end_str(),
            }],
            dimensions: dimensions.iter().map(|name| Named { name }).collect(),
            metrics: metrics.iter().map(|name| Named { name }).collect(),
            limit: self.row_limit,
        };

        let response = post_json(&self.client, self.run_report_url()?, &body).await?;
        Ok(parse_rows(&response, dimensions, metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_rows() {
        let body = json!({
            "dimensionHeaders": [{"name": "sessionDefaultChannelGroup"}],
            "metricHeaders": [{"name": "sessions", "type": "TYPE_INTEGER"}],
            "rows": [
                {
                    "dimensionValues": [{"value": "Organic Search"}],
                    "metricValues": [{"value": "1520"}, {"value": "1100"}]
                },
                {
                    "dimensionValues": [{"value": "Direct"}],
                    "metricValues": [{"value": "n/a"}]
                }
            ],
            "rowCount": 2
        });

        let dataset = parse_rows(
            &body,
            &names(&["sessionDefaultChannelGroup"]),
            &names(&["sessions", "totalUsers"]),
        );

        assert_eq!(dataset.len(), 2);
        let organic = &dataset.rows()[0];
        assert_eq!(organic["sessionDefaultChannelGroup"], Value::from("Organic Search"));
        assert_eq!(organic["sessions"], Value::Number(1520.0));
        assert_eq!(organic["totalUsers"], Value::Number(1100.0));

        let direct = &dataset.rows()[1];
        assert_eq!(direct["sessions"], Value::from("n/a"));
        assert!(!direct.contains_key("totalUsers"));
    }

    #[test]
    fn test_parse_rows_without_rows_is_empty() {
        let body = json!({"rowCount": 0});
        assert!(parse_rows(&body, &names(&["sessionDefaultChannelGroup"]), &names(&["sessions"])).is_empty());
    }

    #[test]
    fn test_run_report_url() {
        let client = AnalyticsClient::new(DummyClient, "123456789", 100);
        assert_eq!(
            client.run_report_url().unwrap().as_str(),
            "https://analyticsdata.googleapis.com/v1beta/properties/123456789:runReport"
        );
    }

    struct DummyClient;

    #[async_trait]
    impl HttpClient for DummyClient {
        async fn execute(&self, _req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            unreachable!("no requests in unit tests")
        }
    }
}
