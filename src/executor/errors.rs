//! Executor error types
//!
//! Two error kinds cross the engine boundary: a query rejected by
//! validation (always before any record is touched) and a well-formed
//! query whose result exceeded the row cap. Record-level anomalies are
//! never errors; they degrade to non-matches inside the pipeline.

use thiserror::Error;

use crate::query::ValidationError;

/// Result type for query execution
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors visible to callers of the query engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The query violated the grammar or schema rules
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The query was well-formed but produced too many rows
    #[error("Query results too large (>{0})")]
    ResultTooLarge(usize),
}

impl QueryError {
    /// Create a result-too-large error for the given cap
    pub fn result_too_large(limit: usize) -> Self {
        QueryError::ResultTooLarge(limit)
    }

    /// Returns true for validation failures
    pub fn is_validation(&self) -> bool {
        matches!(self, QueryError::Validation(_))
    }

    /// Returns true for result-cap failures
    pub fn is_result_too_large(&self) -> bool {
        matches!(self, QueryError::ResultTooLarge(_))
    }
}
