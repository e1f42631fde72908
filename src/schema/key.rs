//! Dataset key parsing and classification
//!
//! A dataset key is `<id>_<field>`, split on the FIRST underscore: the id
//! is caller-assigned and contains no underscore, so everything after the
//! first underscore is the field name.

use super::errors::{KeyError, KeyResult};
use super::fields::{infer_kind, DatasetKind};

/// A classified dataset key reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRef {
    /// Dataset id (prefix before the first underscore)
    pub id: String,
    /// Field name (suffix after the first underscore)
    pub field: String,
    /// Record kind the field belongs to
    pub kind: DatasetKind,
}

/// Splits a key on its first underscore, if any.
pub fn split_key(key: &str) -> Option<(&str, &str)> {
    key.split_once('_')
}

/// Classifies a dataset key, resolving its id, field, and record kind.
///
/// # Errors
///
/// Returns `KeyError` if the key has no underscore, if the id or field
/// part is blank, or if the field is unrecognized in both kinds.
pub fn classify(key: &str) -> KeyResult<KeyRef> {
    let (id, field) = split_key(key).ok_or_else(|| KeyError::not_a_dataset_key(key))?;
    if id.trim().is_empty() || field.trim().is_empty() {
        return Err(KeyError::not_a_dataset_key(key));
    }
    let kind = infer_kind(field).ok_or_else(|| KeyError::unknown_field(key, field))?;
    Ok(KeyRef {
        id: id.to_string(),
        field: field.to_string(),
        kind,
    })
}
