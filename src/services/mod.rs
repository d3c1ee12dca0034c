//! Interfaces to the external collaborators of a report run.

pub mod metrics_source;
pub mod upload_sink;

pub use metrics_source::MetricsSource;
pub use upload_sink::UploadSink;
