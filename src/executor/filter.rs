//! Boolean clause evaluation over records
//!
//! Evaluates a validated filter tree against one record at a time.
//! Record-level anomalies never abort a query: an absent field or a
//! value whose runtime type disagrees with the schema simply fails the
//! comparison, because validation guaranteed operator/field typing
//! against the schema, not against individual record values.

use serde_json::Value;

use crate::dataset::{resolve_field, Record};
use crate::query::{CompareOp, Filter};

/// Evaluates filters against records
pub struct RowFilter;

impl RowFilter {
    /// Returns true if the record satisfies the filter.
    pub fn matches(record: &Record, filter: &Filter, dataset_id: &str) -> bool {
        match filter {
            Filter::All => true,
            Filter::And(subs) => subs.iter().all(|sub| Self::matches(record, sub, dataset_id)),
            Filter::Or(subs) => subs.iter().any(|sub| Self::matches(record, sub, dataset_id)),
            Filter::Not(inner) => !Self::matches(record, inner, dataset_id),
            Filter::Compare { op, key, value } => {
                // Both sides must be actual numbers at evaluation time.
                let actual = match resolve_field(record, key, dataset_id).and_then(Value::as_f64) {
                    Some(actual) => actual,
                    None => return false,
                };
                match op {
                    CompareOp::Lt => actual < *value,
                    CompareOp::Gt => actual > *value,
                    CompareOp::Eq => actual == *value,
                }
            }
            Filter::Is { key, pattern } => resolve_field(record, key, dataset_id)
                .and_then(Value::as_str)
                .map(|actual| pattern.matches(actual))
                .unwrap_or(false),
        }
    }
}
