//! Error types for dataset key classification

use thiserror::Error;

/// Result type for key classification
pub type KeyResult<T> = Result<T, KeyError>;

/// Errors raised when a dataset key cannot be classified
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// The key does not have the `<id>_<field>` shape
    #[error("Key \"{0}\" must be a dataset key")]
    NotADatasetKey(String),

    /// The field suffix is not known to either record kind
    #[error("Unknown field \"{field}\" in key \"{key}\"")]
    UnknownField { key: String, field: String },
}

impl KeyError {
    /// Create a malformed-key error
    pub fn not_a_dataset_key(key: impl Into<String>) -> Self {
        KeyError::NotADatasetKey(key.into())
    }

    /// Create an unknown-field error
    pub fn unknown_field(key: impl Into<String>, field: impl Into<String>) -> Self {
        KeyError::UnknownField {
            key: key.into(),
            field: field.into(),
        }
    }
}
