//! Chart series derived from the analysis bundles.
//!
//! Each series is written as CSV next to the report and drawn as a bar table
//! in the HTML page.

use crate::analyzers::types::AnalysisBundle;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub last_week: Option<f64>,
    pub this_week: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    /// File-name stem, e.g. `clicks_trend`.
    pub slug: &'static str,
    pub title: &'static str,
    /// Stored as a fraction, shown as a percentage.
    pub is_rate: bool,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    pub fn max_value(&self) -> f64 {
        self.points
            .iter()
            .flat_map(|p| [p.this_week, p.last_week.unwrap_or(0.0)])
            .fold(0.0, f64::max)
    }
}

fn totals_series(
    bundle: &AnalysisBundle,
    metric: &str,
    slug: &'static str,
    title: &'static str,
    is_rate: bool,
) -> ChartSeries {
    let points = match bundle.stat(metric) {
        Some(s) => vec![
            ChartPoint {
                label: "Prior week".to_string(),
                last_week: None,
                this_week: s.last_week,
            },
            ChartPoint {
                label: "Current week".to_string(),
                last_week: None,
                this_week: s.this_week,
            },
        ],
        None => Vec::new(),
    };

    ChartSeries {
        slug,
        title,
        is_rate,
        points,
    }
}

/// Every chart of a weekly report, in display order.
pub fn build_charts(search: &AnalysisBundle, traffic: &AnalysisBundle, top: usize) -> Vec<ChartSeries> {
    let channel_points = traffic
        .comparison_records
        .iter()
        .map(|r| {
            let sessions = r.metric(&traffic.rank_metric);
            ChartPoint {
                label: r.key.clone(),
                last_week: Some(sessions.map(|s| s.last_week).unwrap_or(0.0)),
                this_week: sessions.map(|s| s.this_week).unwrap_or(0.0),
            }
        })
        .collect();

    let top_points = search
        .top_rows
        .iter()
        .take(top)
        .map(|row| ChartPoint {
            label: row
                .get(&search.key_column)
                .map(|v| v.to_string())
                .unwrap_or_default(),
            last_week: None,
            this_week: row
                .get(&search.rank_metric)
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0),
        })
        .collect();

    vec![
        totals_series(search, "clicks", "clicks_trend", "Clicks trend", false),
        totals_series(search, "ctr", "ctr_comparison", "CTR trend", true),
        ChartSeries {
            slug: "channel_sessions",
            title: "Sessions by channel",
            is_rate: false,
            points: channel_points,
        },
        ChartSeries {
            slug: "top_queries",
            title: "Top search queries",
            is_rate: false,
            points: top_points,
        },
    ]
}
