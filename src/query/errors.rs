//! Query validation error types
//!
//! Every validation failure names the rule group it violated and carries
//! a human-readable message describing the specific violation. Messages
//! are part of the public contract: callers surface them verbatim.

use thiserror::Error;

use crate::schema::KeyError;

/// Result type for validation
pub type ValidationResult<T> = Result<T, ValidationError>;

/// The rule group a validation failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationRule {
    /// Top-level query shape (WHERE/OPTIONS presence, unexpected keys)
    Structure,
    /// OPTIONS shape (COLUMNS, ORDER)
    Options,
    /// WHERE clause grammar and operator/field typing
    Where,
    /// TRANSFORMATIONS grammar (GROUP/APPLY)
    Transformations,
    /// Dataset key shape or unknown field
    Key,
    /// Dataset id/kind resolution across the whole query
    Dataset,
    /// COLUMNS consistency with TRANSFORMATIONS
    Columns,
    /// ORDER consistency with COLUMNS
    Order,
}

impl ValidationRule {
    /// Returns the rule group name for diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationRule::Structure => "STRUCTURE",
            ValidationRule::Options => "OPTIONS",
            ValidationRule::Where => "WHERE",
            ValidationRule::Transformations => "TRANSFORMATIONS",
            ValidationRule::Key => "KEY",
            ValidationRule::Dataset => "DATASET",
            ValidationRule::Columns => "COLUMNS",
            ValidationRule::Order => "ORDER",
        }
    }
}

/// A query rejected before any record was touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    rule: ValidationRule,
    message: String,
}

impl ValidationError {
    fn new(rule: ValidationRule, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
        }
    }

    /// Top-level structure violation
    pub fn structure(message: impl Into<String>) -> Self {
        Self::new(ValidationRule::Structure, message)
    }

    /// OPTIONS violation
    pub fn options(message: impl Into<String>) -> Self {
        Self::new(ValidationRule::Options, message)
    }

    /// WHERE clause violation
    pub fn where_clause(message: impl Into<String>) -> Self {
        Self::new(ValidationRule::Where, message)
    }

    /// TRANSFORMATIONS violation
    pub fn transformations(message: impl Into<String>) -> Self {
        Self::new(ValidationRule::Transformations, message)
    }

    /// Dataset resolution violation
    pub fn dataset(message: impl Into<String>) -> Self {
        Self::new(ValidationRule::Dataset, message)
    }

    /// COLUMNS consistency violation
    pub fn columns(message: impl Into<String>) -> Self {
        Self::new(ValidationRule::Columns, message)
    }

    /// ORDER consistency violation
    pub fn order(message: impl Into<String>) -> Self {
        Self::new(ValidationRule::Order, message)
    }

    /// Returns the rule group that failed
    pub fn rule(&self) -> ValidationRule {
        self.rule
    }

    /// Returns the human-readable description
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<KeyError> for ValidationError {
    fn from(err: KeyError) -> Self {
        Self::new(ValidationRule::Key, err.to_string())
    }
}
