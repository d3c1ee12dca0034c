use crate::analyzers::types::SummaryStatistics;
use crate::analyzers::utility::metric_change;
use crate::dataset::Dataset;
use crate::error::{AnalysisError, AnalysisResult, Side};

/// Compares window totals for each metric.
///
/// Totals are summed over every raw row of each window before any join, so
/// a key seen in only one window still counts fully toward that window.
/// Delta and percent change follow the same zero-denominator rule as
/// [`compare`](crate::analyzers::compare::compare).
pub fn summarize(
    current: &Dataset,
    prior: &Dataset,
    metrics: &[String],
) -> AnalysisResult<SummaryStatistics> {
    if metrics.is_empty() {
        return Err(AnalysisError::NoMetrics);
    }

    let mut summary = SummaryStatistics::new();

    for metric in metrics {
        current.require_metric(metric, Side::Current)?;
        prior.require_metric(metric, Side::Prior)?;

        let this_total = current.sum(metric)?;
        let last_total = prior.sum(metric)?;

        summary.insert(metric.clone(), metric_change(this_total, last_total));
    }

    Ok(summary)
}
