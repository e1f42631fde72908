//! Dataset boundary error types

use thiserror::Error;

/// Result type for dataset construction
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Errors raised when constructing a dataset
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    /// The id is blank or contains an underscore
    #[error("Invalid dataset id \"{0}\"")]
    InvalidId(String),

    /// No usable records were supplied
    #[error("No valid entries found in dataset \"{0}\"")]
    NoValidRows(String),
}

impl DatasetError {
    pub fn invalid_id(id: impl Into<String>) -> Self {
        DatasetError::InvalidId(id.into())
    }

    pub fn no_valid_rows(id: impl Into<String>) -> Self {
        DatasetError::NoValidRows(id.into())
    }
}
