//! Error handling for the dashboard engine.

use thiserror::Error;

/// Specialized error type for report generation
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The supplied configuration is unusable
    #[error("configuration error: {0}")]
    Config(String),
    /// The age bucket bounds are empty, unsorted or duplicated
    #[error("invalid age bucket bounds: {0:?}")]
    InvalidAgeBuckets(Vec<u16>),
    /// The evaluation date lies before the qualifying date
    #[error("evaluation time {eval} lies before the qualifying date {qualifying}")]
    EvalBeforeQualifying {
        /// Evaluation timestamp supplied by the caller
        eval: chrono::NaiveDateTime,
        /// Configured start of the reporting period
        qualifying: chrono::NaiveDate,
    },
}

/// Result type for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;
