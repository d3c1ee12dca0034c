use crate::analyzers::types::MetricChange;

/// Percent change from `last` to `this`.
///
/// A zero `last` never divides: growth from nothing is reported as exactly
/// 100, and nothing to nothing as 0. Large jumps from zero are therefore
/// capped at +100%.
pub fn change_pct(this: f64, last: f64) -> f64 {
    if last != 0.0 {
        (this - last) / last * 100.0
    } else if this > 0.0 {
        100.0
    } else {
        0.0
    }
}

/// Builds the full [`MetricChange`] for a pair of window values.
pub fn metric_change(this_week: f64, last_week: f64) -> MetricChange {
    MetricChange {
        this_week,
        last_week,
        delta: this_week - last_week,
        change_pct: change_pct(this_week, last_week),
    }
}
