//! Query validator
//!
//! Validates an untyped JSON query against the grammar in QUERY.md and
//! produces a typed `Query` resolved to exactly one dataset. Checks run
//! in a fixed order and short-circuit on the first failure, since later
//! checks assume earlier invariants:
//!
//! 1. top-level structure
//! 2. OPTIONS shape
//! 3. WHERE clause (collecting dataset key references)
//! 4. TRANSFORMATIONS (if present)
//! 5. dataset id and kind resolution across all references
//! 6. COLUMNS vs TRANSFORMATIONS consistency, ORDER within COLUMNS

use serde_json::Value;

use crate::schema::{classify, infer_kind, split_key, DatasetKind, KeyRef};

use super::ast::Query;
use super::errors::{ValidationError, ValidationResult};
use super::options::{validate_options, RawOptions};
use super::transformations::{validate_transformations, ValidatedTransformations};
use super::where_clause::validate_where;

/// Validates untyped queries into typed ones.
pub struct QueryValidator;

impl QueryValidator {
    /// Validates a query, resolving the single dataset it references.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` describing the first violated rule. No
    /// record data is ever consulted; validation depends only on the
    /// query and the static field tables.
    pub fn validate(query: &Value) -> ValidationResult<Query> {
        let obj = query
            .as_object()
            .ok_or_else(|| ValidationError::structure("Query must be an object"))?;
        if !obj.contains_key("WHERE") || !obj.contains_key("OPTIONS") {
            return Err(ValidationError::structure(
                "Query must have WHERE and OPTIONS",
            ));
        }
        if obj
            .keys()
            .any(|k| !matches!(k.as_str(), "WHERE" | "OPTIONS" | "TRANSFORMATIONS"))
        {
            return Err(ValidationError::structure(
                "Query contains unexpected top-level keys",
            ));
        }

        let options = validate_options(&obj["OPTIONS"])?;
        let (filter, where_refs) = validate_where(&obj["WHERE"])?;
        let transformations = match obj.get("TRANSFORMATIONS") {
            Some(t) => Some(validate_transformations(t)?),
            None => None,
        };

        let dataset_id = resolve_dataset_id(&where_refs, transformations.as_ref(), &options)?;
        let kind = resolve_kind(&where_refs, transformations.as_ref(), &options)?;

        check_columns(&options.columns, transformations.as_ref(), kind)?;
        check_order(&options)?;

        Ok(Query {
            dataset_id,
            kind,
            filter,
            columns: options.columns,
            order: options.order,
            transformations: transformations.map(|t| t.transformations),
        })
    }
}

/// Extracts the id prefix of every dataset-key-shaped string in `keys`.
fn ids_from_keys<'a>(keys: impl Iterator<Item = &'a String>, ids: &mut Vec<String>) {
    for key in keys {
        if let Some((id, _)) = split_key(key) {
            if !id.is_empty() && !ids.iter().any(|seen| seen == id) {
                ids.push(id.to_string());
            }
        }
    }
}

/// Unions the dataset ids referenced anywhere in the query; exactly one
/// must remain. Column and order entries without the `<id>_<field>` shape
/// (apply keys) contribute nothing.
fn resolve_dataset_id(
    where_refs: &[KeyRef],
    transformations: Option<&ValidatedTransformations>,
    options: &RawOptions,
) -> ValidationResult<String> {
    let mut ids: Vec<String> = Vec::new();
    for key_ref in where_refs {
        if !ids.contains(&key_ref.id) {
            ids.push(key_ref.id.clone());
        }
    }
    if let Some(t) = transformations {
        if !ids.contains(&t.dataset_id) {
            ids.push(t.dataset_id.clone());
        }
    }
    ids_from_keys(options.columns.iter(), &mut ids);
    if let Some(order) = &options.order {
        ids_from_keys(order.keys().iter(), &mut ids);
    }

    if ids.len() != 1 {
        return Err(ValidationError::dataset(
            "Query must reference exactly one dataset id",
        ));
    }
    Ok(ids.remove(0))
}

/// Resolves the record kind: TRANSFORMATIONS wins, then WHERE, then
/// inference from COLUMNS/ORDER field names.
fn resolve_kind(
    where_refs: &[KeyRef],
    transformations: Option<&ValidatedTransformations>,
    options: &RawOptions,
) -> ValidationResult<DatasetKind> {
    if let Some(t) = transformations {
        return Ok(t.kind);
    }
    if let Some(first) = where_refs.first() {
        return Ok(first.kind);
    }

    let mut candidates: Vec<&String> = options.columns.iter().collect();
    if let Some(order) = &options.order {
        candidates.extend(order.keys());
    }

    let mut kinds: Vec<DatasetKind> = Vec::new();
    for key in candidates {
        if let Some((_, field)) = split_key(key) {
            if let Some(kind) = infer_kind(field) {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
        }
    }

    if kinds.len() == 1 {
        Ok(kinds[0])
    } else {
        Err(ValidationError::dataset(
            "Unable to infer dataset kind from query",
        ))
    }
}

/// With TRANSFORMATIONS every column must be a GROUP key or an APPLY key;
/// without, every column must be a dataset key of the resolved kind.
fn check_columns(
    columns: &[String],
    transformations: Option<&ValidatedTransformations>,
    kind: DatasetKind,
) -> ValidationResult<()> {
    match transformations {
        Some(t) => {
            for column in columns {
                let in_group = t.transformations.group.iter().any(|g| g == column);
                let in_apply = t
                    .transformations
                    .apply
                    .iter()
                    .any(|rule| &rule.apply_key == column);
                if !in_group && !in_apply {
                    return Err(ValidationError::columns(format!(
                        "COLUMNS element \"{column}\" is not a GROUP key or an APPLY key"
                    )));
                }
            }
        }
        None => {
            for column in columns {
                let key_ref = classify(column)?;
                if key_ref.kind != kind {
                    return Err(ValidationError::columns(format!(
                        "COLUMNS element \"{column}\" is not a valid {kind} key"
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Every ORDER key must also appear in COLUMNS.
fn check_order(options: &RawOptions) -> ValidationResult<()> {
    let Some(order) = &options.order else {
        return Ok(());
    };
    for key in order.keys() {
        if !options.columns.contains(key) {
            return Err(ValidationError::order(
                "ORDER key must also appear in OPTIONS.COLUMNS",
            ));
        }
    }
    Ok(())
}
