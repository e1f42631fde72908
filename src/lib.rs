//! insightdb - a strict, deterministic, in-process query engine for
//! campus course and room datasets
//!
//! Callers hand the engine a JSON-shaped query plus an in-memory
//! sequence of flat records; the engine validates the query against the
//! dataset schema, runs filter → group/aggregate → project → sort, and
//! returns a capped result set. See QUERY.md for the query language.
//!
//! ```
//! use insightdb::{QueryExecutor, Record};
//! use serde_json::json;
//!
//! let records: Vec<Record> = vec![
//!     json!({"dept": "cpsc", "avg": 85.2}).as_object().unwrap().clone(),
//!     json!({"dept": "math", "avg": 71.9}).as_object().unwrap().clone(),
//! ];
//!
//! let query = json!({
//!     "WHERE": {"GT": {"courses_avg": 80}},
//!     "OPTIONS": {"COLUMNS": ["courses_dept", "courses_avg"]}
//! });
//!
//! let result = QueryExecutor::new().execute(&query, &records).unwrap();
//! assert_eq!(result.len(), 1);
//! assert_eq!(result[0]["courses_dept"], json!("cpsc"));
//! ```

pub mod dataset;
pub mod executor;
pub mod query;
pub mod schema;

pub use dataset::{Dataset, DatasetError, Record};
pub use executor::{QueryError, QueryExecutor, QueryResult, MAX_QUERY_RESULTS};
pub use query::{Query, QueryValidator, ValidationError};
pub use schema::DatasetKind;
