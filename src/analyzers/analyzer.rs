use crate::analyzers::aggregate::summarize;
use crate::analyzers::compare::compare;
use crate::analyzers::rank::{biggest_movers, top_n};
use crate::analyzers::types::{AnalysisBundle, Direction};
use crate::config::SourceConfig;
use crate::dataset::Dataset;
use crate::error::AnalysisResult;
use tracing::debug;

/// Runs the full week-over-week analysis for one metrics source.
///
/// Totals come from the raw windows, top rows from the current window, and
/// movers from the joined comparison.
pub fn analyze(
    current: &Dataset,
    prior: &Dataset,
    source: &SourceConfig,
) -> AnalysisResult<AnalysisBundle> {
    let key_column = source.key_column();

    let comparison_records = compare(current, prior, key_column, &source.metrics)?;
    let summary_stats = summarize(current, prior, &source.metrics)?;
    let top_rows = top_n(current, &source.rank_metric, source.top_n)?;
    let movers = biggest_movers(
        &comparison_records,
        &source.rank_metric,
        source.movers_n,
        Direction::Both,
    );

    debug!(
        key_column,
        current_rows = current.len(),
        prior_rows = prior.len(),
        compared = comparison_records.len(),
        "Analysis complete"
    );

    Ok(AnalysisBundle {
        key_column: key_column.to_string(),
        rank_metric: source.rank_metric.clone(),
        summary_stats,
        comparison_records,
        top_rows,
        movers,
    })
}
