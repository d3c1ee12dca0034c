//! Threshold-driven recommended actions.
//!
//! Rules are evaluated in table order and each fires independently. The
//! stable catch-all is added only when nothing else fired.

use crate::analyzers::types::AnalysisBundle;
use crate::narrative::trend::oriented_change;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActionCategory {
    Urgent,
    Opportunity,
    Caution,
    Stable,
}

impl ActionCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ActionCategory::Urgent => "Urgent",
            ActionCategory::Opportunity => "Opportunity",
            ActionCategory::Caution => "Caution",
            ActionCategory::Stable => "Stable",
        }
    }
}

/// A recommendation emitted into the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionItem {
    pub category: ActionCategory,
    pub glyph: &'static str,
    pub message: &'static str,
}

/// The numbers the rules look at, pulled out of both analysis bundles.
///
/// A `None` change means the metric was not in the bundle; rules on it do
/// not fire.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Signals {
    pub clicks_change: Option<f64>,
    pub ctr_change: Option<f64>,
    pub position_change: Option<f64>,
    pub has_improved_mover: bool,
    pub sessions_change: Option<f64>,
}

impl Signals {
    pub fn from_bundles(search: &AnalysisBundle, traffic: &AnalysisBundle) -> Self {
        let change = |bundle: &AnalysisBundle, metric: &str| bundle.stat(metric).map(|s| s.change_pct);

        Self {
            clicks_change: change(search, "clicks"),
            ctr_change: change(search, "ctr"),
            position_change: change(search, "position"),
            has_improved_mover: search.movers.has_improved(),
            sessions_change: change(traffic, "sessions"),
        }
    }
}

struct ActionRule {
    fires: fn(&Signals) -> bool,
    item: ActionItem,
}

fn better_than(metric: &str, change: Option<f64>, threshold: f64) -> bool {
    change.is_some_and(|c| oriented_change(metric, c) > threshold)
}

fn worse_than(metric: &str, change: Option<f64>, threshold: f64) -> bool {
    change.is_some_and(|c| oriented_change(metric, c) < -threshold)
}

fn clicks_dropped(s: &Signals) -> bool {
    worse_than("clicks", s.clicks_change, 10.0)
}

fn clicks_surged(s: &Signals) -> bool {
    better_than("clicks", s.clicks_change, 10.0)
}

fn ctr_dropped(s: &Signals) -> bool {
    worse_than("ctr", s.ctr_change, 5.0)
}

// position rising by more than 5% is a worse rank
fn position_worsened(s: &Signals) -> bool {
    worse_than("position", s.position_change, 5.0)
}

fn has_growing_queries(s: &Signals) -> bool {
    s.has_improved_mover
}

fn sessions_dropped(s: &Signals) -> bool {
    worse_than("sessions", s.sessions_change, 10.0)
}

static RULES: &[ActionRule] = &[
    ActionRule {
        fires: clicks_dropped,
        item: ActionItem {
            category: ActionCategory::Urgent,
            glyph: "🔴",
            message: "Clicks dropped sharply. Analyze the declining queries and consider \
                      improving their content and internal linking.",
        },
    },
    ActionRule {
        fires: clicks_surged,
        item: ActionItem {
            category: ActionCategory::Opportunity,
            glyph: "🟢",
            message: "Clicks grew strongly. Identify what drove the growth and roll the same \
                      approach out to other pages.",
        },
    },
    ActionRule {
        fires: ctr_dropped,
        item: ActionItem {
            category: ActionCategory::Caution,
            glyph: "🟡",
            message: "CTR is falling. Review title tags and meta descriptions.",
        },
    },
    ActionRule {
        fires: position_worsened,
        item: ActionItem {
            category: ActionCategory::Caution,
            glyph: "🟡",
            message: "Average position slipped. Strengthen content quality and SEO work.",
        },
    },
    ActionRule {
        fires: has_growing_queries,
        item: ActionItem {
            category: ActionCategory::Opportunity,
            glyph: "💡",
            message: "Expand content around the growing queries to push traffic further.",
        },
    },
    ActionRule {
        fires: sessions_dropped,
        item: ActionItem {
            category: ActionCategory::Urgent,
            glyph: "🔴",
            message: "Sessions dropped sharply across the site. Check every channel's \
                      performance and pin down the cause.",
        },
    },
];

static STABLE: ActionItem = ActionItem {
    category: ActionCategory::Stable,
    glyph: "✅",
    message: "Performance is stable overall. Keep improving and keep monitoring.",
};

/// Returns the actions that fire for `signals`, in rule order.
pub fn evaluate_actions(signals: &Signals) -> Vec<ActionItem> {
    let mut actions: Vec<ActionItem> = RULES
        .iter()
        .filter(|rule| (rule.fires)(signals))
        .map(|rule| rule.item)
        .collect();

    if actions.is_empty() {
        actions.push(STABLE);
    }

    actions
}
