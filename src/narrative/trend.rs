//! Trend classification for the tracked report metrics.

use serde::Serialize;

/// Whether a larger value of a metric is good news.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    HigherIsBetter,
    /// Average position: rank 1 is the top of the results page.
    LowerIsBetter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Improving,
    Declining,
}

/// How a headline value is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Count,
    /// Stored as a fraction, shown as a percentage.
    Rate,
    Rank,
}

/// A metric that gets a headline line in the summary.
#[derive(Debug, Clone, Copy)]
pub struct TrackedMetric {
    pub column: &'static str,
    pub label: &'static str,
    pub unit: Unit,
    pub improving_glyph: &'static str,
    pub declining_glyph: &'static str,
}

impl TrackedMetric {
    pub fn classify(&self, change_pct: f64) -> Trend {
        classify(self.column, change_pct)
    }

    pub fn glyph(&self, change_pct: f64) -> &'static str {
        match self.classify(change_pct) {
            Trend::Improving => self.improving_glyph,
            Trend::Declining => self.declining_glyph,
        }
    }
}

pub static SEARCH_METRICS: &[TrackedMetric] = &[
    TrackedMetric {
        column: "clicks",
        label: "Search clicks",
        unit: Unit::Count,
        improving_glyph: "📈",
        declining_glyph: "📉",
    },
    TrackedMetric {
        column: "impressions",
        label: "Impressions",
        unit: Unit::Count,
        improving_glyph: "👀",
        declining_glyph: "👁️",
    },
    TrackedMetric {
        column: "ctr",
        label: "Click-through rate (CTR)",
        unit: Unit::Rate,
        improving_glyph: "✅",
        declining_glyph: "⚠️",
    },
    TrackedMetric {
        column: "position",
        label: "Average position",
        unit: Unit::Rank,
        improving_glyph: "⬆️",
        declining_glyph: "⬇️",
    },
];

pub static TRAFFIC_METRICS: &[TrackedMetric] = &[
    TrackedMetric {
        column: "sessions",
        label: "Total sessions",
        unit: Unit::Count,
        improving_glyph: "📊",
        declining_glyph: "📉",
    },
    TrackedMetric {
        column: "totalUsers",
        label: "Total users",
        unit: Unit::Count,
        improving_glyph: "👥",
        declining_glyph: "👤",
    },
    TrackedMetric {
        column: "screenPageViews",
        label: "Page views",
        unit: Unit::Count,
        improving_glyph: "📄",
        declining_glyph: "📃",
    },
];

/// Polarity of a metric column. Only average position is inverted.
pub fn polarity(metric: &str) -> Polarity {
    match metric {
        "position" => Polarity::LowerIsBetter,
        _ => Polarity::HigherIsBetter,
    }
}

/// Classifies a metric's week-over-week change.
///
/// | Polarity       | change_pct > 0 | change_pct < 0 | 0         |
/// |----------------|----------------|----------------|-----------|
/// | HigherIsBetter | Improving      | Declining      | Declining |
/// | LowerIsBetter  | Declining      | Improving      | Declining |
pub fn classify(metric: &str, change_pct: f64) -> Trend {
    match polarity(metric) {
        Polarity::HigherIsBetter if change_pct > 0.0 => Trend::Improving,
        Polarity::LowerIsBetter if change_pct < 0.0 => Trend::Improving,
        _ => Trend::Declining,
    }
}

/// Change expressed so that positive always means "got better".
pub fn oriented_change(metric: &str, change_pct: f64) -> f64 {
    match polarity(metric) {
        Polarity::HigherIsBetter => change_pct,
        Polarity::LowerIsBetter => -change_pct,
    }
}
