use crate::analyzers::types::{ComparisonRecord, MetricComparison};
use crate::analyzers::utility::metric_change;
use crate::dataset::Dataset;
use crate::error::{AnalysisError, AnalysisResult, Side};
use std::collections::{HashMap, HashSet};

/// Joins the current and prior windows on `key_column` and compares each
/// metric.
///
/// This is a full outer join: every key from either window appears exactly
/// once, current-window keys first in first-seen order, then keys only seen
/// in the prior window. Duplicate keys within a window are summed before
/// joining. A key missing from one side compares against 0.
///
/// # Errors
///
/// Fails when a row lacks `key_column`, when a metric column is absent from a
/// non-empty window, or when `metrics` is empty.
pub fn compare(
    current: &Dataset,
    prior: &Dataset,
    key_column: &str,
    metrics: &[String],
) -> AnalysisResult<Vec<ComparisonRecord>> {
    if metrics.is_empty() {
        return Err(AnalysisError::NoMetrics);
    }

    current.require_key(key_column, Side::Current)?;
    prior.require_key(key_column, Side::Prior)?;
    for m in metrics {
        current.require_metric(m, Side::Current)?;
        prior.require_metric(m, Side::Prior)?;
    }

    let this_week = current.group_by_key(key_column, metrics)?;
    let last_week = prior.group_by_key(key_column, metrics)?;

    let last_by_key: HashMap<&str, &HashMap<String, f64>> = last_week
        .iter()
        .map(|(k, v)| (k.as_str(), v))
        .collect();
    let seen: HashSet<&str> = this_week.iter().map(|(k, _)| k.as_str()).collect();

    let empty = HashMap::new();
    let prior_only = last_week
        .iter()
        .filter(|(k, _)| !seen.contains(k.as_str()))
        .map(|(k, _)| (k.as_str(), &empty));

    let keys = this_week
        .iter()
        .map(|(k, v)| (k.as_str(), v))
        .chain(prior_only);

    let records = keys
        .map(|(key, this_values)| {
            let last_values = last_by_key.get(key).copied().unwrap_or(&empty);
            let metrics = metrics
                .iter()
                .map(|m| MetricComparison {
                    metric: m.clone(),
                    change: metric_change(
                        this_values.get(m).copied().unwrap_or(0.0),
                        last_values.get(m).copied().unwrap_or(0.0),
                    ),
                })
                .collect();

            ComparisonRecord {
                key_column: key_column.to_string(),
                key: key.to_string(),
                metrics,
            }
        })
        .collect();

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Value, row};

    fn clicks_row(query: &str, clicks: f64) -> crate::dataset::Row {
        row([("query", Value::from(query)), ("clicks", Value::from(clicks))])
    }

    fn clicks() -> Vec<String> {
        vec!["clicks".to_string()]
    }

    #[test]
    fn test_outer_join_scenario() {
        let current = Dataset::new(vec![clicks_row("a", 10.0), clicks_row("b", 0.0)]);
        let prior = Dataset::new(vec![clicks_row("a", 5.0), clicks_row("c", 3.0)]);

        let records = compare(&current, &prior, "query", &clicks()).unwrap();
        assert_eq!(records.len(), 3);

        let keys: Vec<_> = records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);

        let a = records[0].metric("clicks").unwrap();
        assert_eq!((a.this_week, a.last_week, a.delta, a.change_pct), (10.0, 5.0, 5.0, 100.0));

        let b = records[1].metric("clicks").unwrap();
        assert_eq!((b.this_week, b.last_week, b.delta, b.change_pct), (0.0, 0.0, 0.0, 0.0));

        let c = records[2].metric("clicks").unwrap();
        assert_eq!((c.this_week, c.last_week, c.delta, c.change_pct), (0.0, 3.0, -3.0, -100.0));
    }

    #[test]
    fn test_row_count_is_key_union() {
        let current = Dataset::new(vec![clicks_row("a", 1.0), clicks_row("b", 2.0), clicks_row("d", 1.0)]);
        let prior = Dataset::new(vec![clicks_row("b", 1.0), clicks_row("c", 4.0), clicks_row("d", 1.0)]);
        let records = compare(&current, &prior, "query", &clicks()).unwrap();
        assert_eq!(records.len(), 4);

        let disjoint = compare(
            &Dataset::new(vec![clicks_row("x", 1.0)]),
            &Dataset::new(vec![clicks_row("y", 1.0)]),
            "query",
            &clicks(),
        )
        .unwrap();
        assert_eq!(disjoint.len(), 2);
    }

    #[test]
    fn test_new_key_is_plus_hundred_percent() {
        let current = Dataset::new(vec![clicks_row("new", 250.0)]);
        let records = compare(&current, &Dataset::empty(), "query", &clicks()).unwrap();
        let c = records[0].metric("clicks").unwrap();
        assert_eq!(c.change_pct, 100.0);
        assert_eq!(c.delta, 250.0);
    }

    #[test]
    fn test_duplicate_keys_are_summed() {
        let current = Dataset::new(vec![clicks_row("a", 2.0), clicks_row("a", 3.0)]);
        let prior = Dataset::new(vec![clicks_row("a", 4.0)]);
        let records = compare(&current, &prior, "query", &clicks()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].metric("clicks").unwrap().this_week, 5.0);
        assert_eq!(records[0].metric("clicks").unwrap().change_pct, 25.0);
    }

    #[test]
    fn test_missing_key_column_fails_fast() {
        let current = Dataset::new(vec![clicks_row("a", 1.0)]);
        let err = compare(&current, &current, "page", &clicks()).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::MissingColumn {
                column: "page".into(),
                dataset: Side::Current
            }
        );
    }

    #[test]
    fn test_missing_metric_column_fails_fast() {
        let current = Dataset::new(vec![clicks_row("a", 1.0)]);
        let err = compare(&current, &current, "query", &["click".to_string()]).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingColumn { .. }));
    }

    #[test]
    fn test_empty_metrics_rejected() {
        let err = compare(&Dataset::empty(), &Dataset::empty(), "query", &[]).unwrap_err();
        assert_eq!(err, AnalysisError::NoMetrics);
    }

    #[test]
    fn test_both_empty_gives_no_records() {
        let records = compare(&Dataset::empty(), &Dataset::empty(), "query", &clicks()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_to_row_flattens_columns() {
        let current = Dataset::new(vec![clicks_row("a", 4.0)]);
        let prior = Dataset::new(vec![clicks_row("a", 2.0)]);
        let records = compare(&current, &prior, "query", &clicks()).unwrap();
        let flat = records[0].to_row();
        assert_eq!(flat["query"], Value::Text("a".into()));
        assert_eq!(flat["clicks_this_week"], Value::Number(4.0));
        assert_eq!(flat["clicks_last_week"], Value::Number(2.0));
        assert_eq!(flat["clicks_delta"], Value::Number(2.0));
        assert_eq!(flat["clicks_change_pct"], Value::Number(100.0));
    }
}
