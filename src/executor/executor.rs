//! Query executor
//!
//! Runs a validated query through the fixed pipeline:
//!
//! 1. Filter records with the WHERE clause
//! 2. Group and aggregate when TRANSFORMATIONS is present
//! 3. Project the COLUMNS keys, in order
//! 4. Sort per ORDER, stably
//! 5. Enforce the result cap
//!
//! Execution is a pure function of (query, records): deterministic, no
//! shared state, no I/O. The same immutable inputs yield byte-identical
//! output including tie order.

use serde_json::Value;
use tracing::debug;

use crate::dataset::{resolve_field, Record};
use crate::query::{Query, QueryValidator};

use super::aggregate::GroupAggregator;
use super::errors::{QueryError, QueryResult};
use super::filter::RowFilter;
use super::sorter::ResultSorter;

/// Maximum number of rows a query may return
pub const MAX_QUERY_RESULTS: usize = 5000;

/// Executes queries against in-memory record sequences.
///
/// The cap is enforced on the final row count regardless of the WHERE
/// clause; a restrictive-looking filter can still select every record.
pub struct QueryExecutor {
    max_results: usize,
}

impl QueryExecutor {
    /// Creates an executor with the standard result cap
    pub fn new() -> Self {
        Self {
            max_results: MAX_QUERY_RESULTS,
        }
    }

    /// Creates an executor with a custom result cap
    pub fn with_max_results(max_results: usize) -> Self {
        Self { max_results }
    }

    /// Validates and executes an untyped JSON query.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Validation` before touching any record if
    /// the query is ill-formed, or `QueryError::ResultTooLarge` if the
    /// result would exceed the cap.
    pub fn execute(&self, query: &Value, records: &[Record]) -> QueryResult<Vec<Record>> {
        let query = QueryValidator::validate(query)?;
        self.execute_validated(&query, records)
    }

    /// Executes an already-validated query.
    pub fn execute_validated(&self, query: &Query, records: &[Record]) -> QueryResult<Vec<Record>> {
        // 1. Filter
        let filtered: Vec<&Record> = records
            .iter()
            .filter(|record| RowFilter::matches(record, &query.filter, &query.dataset_id))
            .collect();
        debug!(
            dataset = %query.dataset_id,
            matched = filtered.len(),
            scanned = records.len(),
            "filter stage complete"
        );

        // 2. Group/aggregate, 3. Project
        let mut rows = match &query.transformations {
            Some(transformations) => {
                let grouped = GroupAggregator::transform(&filtered, transformations, &query.dataset_id);
                debug!(groups = grouped.len(), "aggregation stage complete");
                Self::project(grouped.iter(), &query.columns, &query.dataset_id)
            }
            None => Self::project(filtered.into_iter(), &query.columns, &query.dataset_id),
        };

        // 4. Sort
        if let Some(order) = &query.order {
            ResultSorter::sort(&mut rows, order);
        }

        // 5. Cap
        if rows.len() > self.max_results {
            debug!(rows = rows.len(), cap = self.max_results, "result cap exceeded");
            return Err(QueryError::result_too_large(self.max_results));
        }

        debug!(rows = rows.len(), "query complete");
        Ok(rows)
    }

    /// Builds one output record per row with exactly the COLUMNS keys in
    /// the order given. A key that does not resolve is omitted from the
    /// output record.
    fn project<'a>(
        rows: impl Iterator<Item = &'a Record>,
        columns: &[String],
        dataset_id: &str,
    ) -> Vec<Record> {
        rows.map(|row| {
            let mut out = Record::new();
            for column in columns {
                if let Some(value) = resolve_field(row, column, dataset_id) {
                    out.insert(column.clone(), value.clone());
                }
            }
            out
        })
        .collect()
    }
}

impl Default for QueryExecutor {
    fn default() -> Self {
        Self::new()
    }
}
