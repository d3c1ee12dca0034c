//! Markdown executive summary.

use crate::analyzers::types::{AnalysisBundle, ComparisonRecord, MetricChange};
use crate::narrative::actions::{Signals, evaluate_actions};
use crate::narrative::trend::{SEARCH_METRICS, TRAFFIC_METRICS, TrackedMetric, Trend, Unit};
use num_format::{Locale, ToFormattedString};

/// Channel name highlighted in the traffic section.
const ORGANIC_CHANNEL: &str = "Organic Search";

/// Builds the executive summary from the search (primary) and traffic
/// (secondary) analysis bundles.
///
/// Missing metrics and empty windows produce explicit "no data" lines
/// instead of failing the report.
pub fn build_summary(search: &AnalysisBundle, traffic: &AnalysisBundle) -> String {
    let parts = [
        "# 📊 Weekly SEO Report - Executive Summary\n".to_string(),
        search_section(search),
        traffic_section(traffic),
        actions_section(search, traffic),
    ];

    parts.join("\n\n")
}

pub fn format_count(value: f64) -> String {
    (value as i64).to_formatted_string(&Locale::en)
}

fn format_value(unit: Unit, value: f64) -> String {
    match unit {
        Unit::Count => format_count(value),
        Unit::Rate => format!("{:.2}%", value * 100.0),
        Unit::Rank => format!("{:.1}", value),
    }
}

fn headline(metric: &TrackedMetric, stat: Option<&MetricChange>) -> String {
    match stat {
        Some(s) => format!(
            "{} **{}**: {} (WoW {:+.1}%)",
            metric.glyph(s.change_pct),
            metric.label,
            format_value(metric.unit, s.this_week),
            s.change_pct
        ),
        None => format!("ℹ️ **{}**: no data", metric.label),
    }
}

fn search_section(bundle: &AnalysisBundle) -> String {
    let mut parts = vec!["## 🔍 Search Performance (Search Console)\n".to_string()];

    for metric in SEARCH_METRICS {
        let stat = bundle.stat(metric.column);
        parts.push(headline(metric, stat));

        if metric.column == "clicks"
            && let Some(s) = stat.filter(|s| s.change_pct.abs() > 10.0)
        {
            let direction = match metric.classify(s.change_pct) {
                Trend::Improving => "increase",
                Trend::Declining => "decrease",
            };
            parts.push(format!(
                "   - A {:.1}% {} compared with last week.",
                s.change_pct.abs(),
                direction
            ));
        }
    }

    parts.push(String::new());
    parts.push(top_performer_line(bundle, "query"));
    parts.extend(mover_lines(bundle, "query"));

    parts.join("\n")
}

/// Key text quoted inside a summary line. Asterisks are dropped so a key
/// cannot open or close bold markers.
fn quoted_key(key: &str) -> String {
    key.replace('*', "")
}

fn top_performer_line(bundle: &AnalysisBundle, noun: &str) -> String {
    let top = bundle.top_rows.first().and_then(|row| {
        let key = row.get(&bundle.key_column)?;
        let value = row
            .get(&bundle.rank_metric)
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        Some((quoted_key(&key.to_string()), value))
    });

    match top {
        Some((key, value)) => format!(
            "💡 **Top {}**: \"{}\" ({} {})",
            noun,
            key,
            format_count(value),
            bundle.rank_metric
        ),
        None => format!("ℹ️ **Top {}**: no {} data for this week", noun, noun),
    }
}

fn mover_line(glyph: &str, title: &str, record: &ComparisonRecord, metric: &str) -> String {
    format!(
        "{} **{}**: \"{}\" ({:+} {})",
        glyph,
        title,
        quoted_key(&record.key),
        record.delta(metric) as i64,
        metric
    )
}

fn mover_lines(bundle: &AnalysisBundle, noun: &str) -> Vec<String> {
    let best = bundle.movers.best();
    let worst = bundle.movers.worst();

    if best.is_none() && worst.is_none() {
        return vec![format!("ℹ️ **Movers**: no {} changes to report", noun)];
    }

    let mut lines = Vec::new();
    if let Some(record) = best {
        lines.push(mover_line(
            "🚀",
            &format!("Fastest-growing {}", noun),
            record,
            &bundle.rank_metric,
        ));
    }
    if let Some(record) = worst {
        lines.push(mover_line(
            "⚠️",
            &format!("Biggest {} decline", noun),
            record,
            &bundle.rank_metric,
        ));
    }
    lines
}

fn traffic_section(bundle: &AnalysisBundle) -> String {
    let mut parts = vec!["## 📈 Traffic Analysis (Analytics 4)\n".to_string()];

    for metric in TRAFFIC_METRICS {
        parts.push(headline(metric, bundle.stat(metric.column)));
    }

    if let Some(sessions) = bundle.record(ORGANIC_CHANNEL).and_then(|r| r.metric("sessions")) {
        let glyph = if sessions.change_pct > 0.0 { "🌿" } else { "🍂" };
        parts.push(format!(
            "\n{} **Organic search sessions**: {} (WoW {:+.1}%)",
            glyph,
            format_count(sessions.this_week),
            sessions.change_pct
        ));
    }

    parts.join("\n")
}

fn actions_section(search: &AnalysisBundle, traffic: &AnalysisBundle) -> String {
    let mut parts = vec!["## 🎯 Recommended Actions\n".to_string()];

    let signals = Signals::from_bundles(search, traffic);
    for action in evaluate_actions(&signals) {
        parts.push(format!(
            "{} **{}**: {}",
            action.glyph,
            action.category.label(),
            action.message
        ));
    }

    parts.join("\n\n")
}
