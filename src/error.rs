//! Precondition errors raised by the comparison engine.

use thiserror::Error;

/// Which side of a week-over-week comparison a dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Current,
    Prior,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Current => f.write_str("current"),
            Side::Prior => f.write_str("prior"),
        }
    }
}

/// A caller asked for something the input data cannot provide.
///
/// These are never retried: the caller passed the wrong column name or the
/// upstream source returned rows in an unexpected shape.
#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("missing column '{column}' in {dataset} dataset")]
    MissingColumn { column: String, dataset: Side },

    #[error("column '{column}' holds non-numeric value '{value}'")]
    NonNumeric { column: String, value: String },

    #[error("at least one metric column is required")]
    NoMetrics,
}

pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;
