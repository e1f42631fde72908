//! Dataset boundary types
//!
//! The engine consumes records that a provider has already parsed into
//! flat field maps. This module holds the record type, the dataset
//! container handed across that boundary, and the field-resolution rule
//! shared by filtering, grouping, and projection.

mod errors;
mod sections;

pub use errors::{DatasetError, DatasetResult};
pub use sections::{section_from_raw, sections_from_result};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::DatasetKind;

/// A flat record: field name to number | string value.
pub type Record = serde_json::Map<String, Value>;

/// Resolves a query key against a record.
///
/// A key present verbatim wins; otherwise a `<dataset_id>_<field>` key is
/// stripped to its bare field name. Keys with a foreign id prefix, or
/// fields the record does not carry, resolve to None.
pub fn resolve_field<'a>(record: &'a Record, key: &str, dataset_id: &str) -> Option<&'a Value> {
    if let Some(value) = record.get(key) {
        return Some(value);
    }
    let (id, field) = key.split_once('_')?;
    if id != dataset_id {
        return None;
    }
    record.get(field)
}

/// An in-memory dataset: the record provider's side of the engine
/// boundary. The engine itself never holds datasets; callers own them
/// for the duration of a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    id: String,
    kind: DatasetKind,
    records: Vec<Record>,
}

impl Dataset {
    /// Creates a dataset, enforcing the caller-side id rules.
    ///
    /// # Errors
    ///
    /// Returns `DatasetError::InvalidId` if the id is blank or contains
    /// an underscore, and `DatasetError::NoValidRows` if `records` is
    /// empty.
    pub fn new(
        id: impl Into<String>,
        kind: DatasetKind,
        records: Vec<Record>,
    ) -> DatasetResult<Self> {
        let id = id.into();
        if !is_valid_id(&id) {
            return Err(DatasetError::invalid_id(id));
        }
        if records.is_empty() {
            return Err(DatasetError::no_valid_rows(id));
        }
        Ok(Self { id, kind, records })
    }

    /// Returns the dataset id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the record kind
    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    /// Returns the records, in insertion order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Returns the number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the dataset has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A dataset id must be non-blank and free of underscores, since the
/// underscore separates id from field in dataset keys.
pub fn is_valid_id(id: &str) -> bool {
    !id.trim().is_empty() && !id.contains('_')
}
