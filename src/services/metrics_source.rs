//! Trait for reporting APIs that return one row per dimension tuple.

use crate::dataset::Dataset;
use crate::window::ReportWindow;
use anyhow::Result;

/// A reporting API queried one date window at a time.
#[async_trait::async_trait]
pub trait MetricsSource: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Fetches `metrics` grouped by `dimensions` for `window`.
    ///
    /// Returns an empty dataset, not an error, when the window has no data.
    async fn fetch_window(
        &self,
        window: &ReportWindow,
        dimensions: &[String],
        metrics: &[String],
    ) -> Result<Dataset>;
}
