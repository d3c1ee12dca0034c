use crate::analyzers::types::{ComparisonRecord, Direction, Movers};
use crate::dataset::{Dataset, Row, metric_value};
use crate::error::{AnalysisResult, Side};

/// Returns the `n` rows with the largest `metric`, highest first.
///
/// Ties keep their original row order. Rows without the metric rank as 0.
/// Asking for more rows than exist returns all of them.
pub fn top_n(dataset: &Dataset, metric: &str, n: usize) -> AnalysisResult<Vec<Row>> {
    dataset.require_metric(metric, Side::Current)?;

    let mut scored = Vec::with_capacity(dataset.len());
    for row in dataset.rows() {
        scored.push((metric_value(row, metric)?.unwrap_or(0.0), row));
    }

    // sort_by is stable, so equal values stay in input order
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    Ok(scored
        .into_iter()
        .take(n)
        .map(|(_, row)| row.clone())
        .collect())
}

/// Picks the records whose `metric` delta moved the most.
///
/// `improved` is sorted by delta descending and `declined` ascending (most
/// negative first); both are truncated to `n` and omitted unless `direction`
/// asks for them. Empty input gives empty lists.
pub fn biggest_movers(
    records: &[ComparisonRecord],
    metric: &str,
    n: usize,
    direction: Direction,
) -> Movers {
    let mut movers = Movers::default();

    if matches!(direction, Direction::Up | Direction::Both) {
        let mut improved = records.to_vec();
        improved.sort_by(|a, b| b.delta(metric).total_cmp(&a.delta(metric)));
        improved.truncate(n);
        movers.improved = Some(improved);
    }

    if matches!(direction, Direction::Down | Direction::Both) {
        let mut declined = records.to_vec();
        declined.sort_by(|a, b| a.delta(metric).total_cmp(&b.delta(metric)));
        declined.truncate(n);
        movers.declined = Some(declined);
    }

    movers
}
