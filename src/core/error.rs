//! Failure taxonomy shared by the comparison pipeline

use serde::Serialize;
use thiserror::Error;

/// Errors raised by the comparison pipeline.
///
/// Every variant except `InvalidLookback` is scoped to a single fund: callers
/// record it against that fund and carry on with the rest of the comparison.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail")]
pub enum PipelineError {
    #[error("Fund registry unavailable: {0}")]
    RegistryUnavailable(String),

    #[error("No NAV history available for code {0}")]
    FetchFailed(String),

    #[error("No data in the selected range")]
    NoDataInRange,

    #[error("Insufficient data: {0} point(s), at least 2 required")]
    InsufficientData(usize),

    #[error("First NAV of the series is zero")]
    DivisionByZero,

    #[error("Invalid lookback period: {0}")]
    InvalidLookback(String),
}
