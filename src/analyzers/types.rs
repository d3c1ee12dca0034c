//! Data types produced by the week-over-week analyzers.

use crate::dataset::{Row, Value};
use serde::Serialize;
use std::collections::BTreeMap;

/// Delta and percent change of one metric between two windows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricChange {
    pub this_week: f64,
    pub last_week: f64,
    pub delta: f64,
    pub change_pct: f64,
}

/// One metric's comparison inside a [`ComparisonRecord`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricComparison {
    pub metric: String,
    #[serde(flatten)]
    pub change: MetricChange,
}

/// One key from the full outer join of the current and prior windows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRecord {
    pub key_column: String,
    pub key: String,
    pub metrics: Vec<MetricComparison>,
}

impl ComparisonRecord {
    pub fn metric(&self, name: &str) -> Option<&MetricChange> {
        self.metrics
            .iter()
            .find(|m| m.metric == name)
            .map(|m| &m.change)
    }

    /// Delta of `name`, 0 when the metric was not compared.
    pub fn delta(&self, name: &str) -> f64 {
        self.metric(name).map(|c| c.delta).unwrap_or(0.0)
    }

    /// Flattens the record into `<metric>_this_week`, `<metric>_last_week`,
    /// `<metric>_delta` and `<metric>_change_pct` columns.
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert(self.key_column.clone(), Value::Text(self.key.clone()));
        for m in &self.metrics {
            let c = &m.change;
            row.insert(format!("{}_this_week", m.metric), c.this_week.into());
            row.insert(format!("{}_last_week", m.metric), c.last_week.into());
            row.insert(format!("{}_delta", m.metric), c.delta.into());
            row.insert(format!("{}_change_pct", m.metric), c.change_pct.into());
        }
        row
    }

    /// Column order matching [`ComparisonRecord::to_row`], key first.
    pub fn columns(key_column: &str, metrics: &[String]) -> Vec<String> {
        let mut cols = vec![key_column.to_string()];
        for m in metrics {
            for suffix in ["this_week", "last_week", "delta", "change_pct"] {
                cols.push(format!("{}_{}", m, suffix));
            }
        }
        cols
    }
}

/// Window totals per metric, keyed by metric name.
pub type SummaryStatistics = BTreeMap<String, MetricChange>;

/// Which mover lists to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Both,
}

/// Biggest gainers and losers on one metric's delta.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Movers {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improved: Option<Vec<ComparisonRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declined: Option<Vec<ComparisonRecord>>,
}

impl Movers {
    pub fn best(&self) -> Option<&ComparisonRecord> {
        self.improved.as_ref().and_then(|v| v.first())
    }

    pub fn worst(&self) -> Option<&ComparisonRecord> {
        self.declined.as_ref().and_then(|v| v.first())
    }

    pub fn has_improved(&self) -> bool {
        self.improved.as_ref().is_some_and(|v| !v.is_empty())
    }
}

/// Everything computed for one data source in one report run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisBundle {
    pub key_column: String,
    /// Metric the top rows and movers are ranked by.
    pub rank_metric: String,
    pub summary_stats: SummaryStatistics,
    pub comparison_records: Vec<ComparisonRecord>,
    pub top_rows: Vec<Row>,
    pub movers: Movers,
}

impl AnalysisBundle {
    pub fn stat(&self, metric: &str) -> Option<&MetricChange> {
        self.summary_stats.get(metric)
    }

    pub fn record(&self, key: &str) -> Option<&ComparisonRecord> {
        self.comparison_records.iter().find(|r| r.key == key)
    }
}
