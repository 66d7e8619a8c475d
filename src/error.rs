//! Request-validation errors raised before any query text is produced.

use thiserror::Error;

/// Everything that can make the generator refuse a request.
///
/// All variants are caller-input errors detected synchronously during
/// validation. None of them is retryable as-is; the caller has to correct
/// the request. Failures of downstream query execution are surfaced by the
/// execution layer (`sqlx::Error`) and never mapped into this taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Interval token outside the closed catalog ("5M".."1Y").
    #[error("unsupported interval token: {0}")]
    UnsupportedGranularity(String),

    /// Period token outside the closed catalog ("7D".."ALL").
    #[error("unsupported period token: {0}")]
    UnsupportedSpan(String),

    /// Network code not present in the registry.
    #[error("unknown network code: {0}")]
    UnknownNetwork(String),

    /// Facility-scoped request with no usable facility codes.
    #[error("facility selection is empty")]
    EmptyFacilitySelection,
}
