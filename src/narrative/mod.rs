//! Turns analysis bundles into the executive summary.
//!
//! [`trend`] classifies each tracked metric, [`actions`] holds the
//! threshold rule table, and [`summary`] renders both into Markdown.

pub mod actions;
pub mod summary;
pub mod trend;

pub use summary::build_summary;
