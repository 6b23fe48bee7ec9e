//! Error types for sqlsema operations.

use thiserror::Error;

/// Result type alias using [`SemaError`].
pub type Result<T> = std::result::Result<T, SemaError>;

/// Error types for catalog maintenance and analysis reporting.
///
/// The analysis passes themselves never fail: they return a result value
/// together with diagnostics. These errors surface from catalog mutation,
/// snapshot decoding, and explicit conversion of a report into a `Result`.
#[derive(Debug, Error)]
pub enum SemaError {
    /// Schema-related errors (duplicate table, conflicting abbreviation, etc.).
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// Catalog snapshot encoding or decoding errors.
    #[error("Catalog error: {0}")]
    CatalogError(String),

    /// A type name outside the catalog vocabulary.
    #[error("Type error: expected {expected}, got {actual}")]
    TypeError { expected: String, actual: String },

    /// One or more analysis passes reported errors.
    #[error("Analysis failed with {} error(s): {}", .errors.len(), .errors.join("; "))]
    AnalysisFailed { errors: Vec<String> },
}
