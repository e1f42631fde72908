//! WHERE clause validation
//!
//! Walks the untyped clause tree, producing a typed `Filter` and the list
//! of dataset key references it touches. Checks at every node:
//! - exactly one operator key (or zero keys for the match-all clause)
//! - AND/OR are non-empty arrays, NOT wraps a single clause
//! - LT/GT/EQ reference a numeric field and carry a number
//! - IS references a string field and carries a legal wildcard pattern

use serde_json::Value;

use crate::schema::{classify, field_type, FieldType, KeyRef};

use super::ast::{CompareOp, Filter, WildcardPattern};
use super::errors::{ValidationError, ValidationResult};

/// Validates a WHERE clause, returning the typed filter and every dataset
/// key reference encountered, in document order.
pub(crate) fn validate_where(value: &Value) -> ValidationResult<(Filter, Vec<KeyRef>)> {
    let mut refs = Vec::new();
    let filter = validate_clause(value, &mut refs)?;
    Ok((filter, refs))
}

fn validate_clause(value: &Value, refs: &mut Vec<KeyRef>) -> ValidationResult<Filter> {
    let obj = value
        .as_object()
        .ok_or_else(|| ValidationError::where_clause("WHERE must be an object"))?;

    // The empty object is the match-all clause.
    if obj.is_empty() {
        return Ok(Filter::All);
    }
    if obj.len() != 1 {
        return Err(ValidationError::where_clause(
            "WHERE must have exactly one key",
        ));
    }

    let (op, val) = obj.iter().next().expect("clause has exactly one key");
    match op.as_str() {
        "AND" => Ok(Filter::And(validate_logical("AND", val, refs)?)),
        "OR" => Ok(Filter::Or(validate_logical("OR", val, refs)?)),
        "NOT" => {
            let ok = val.as_object().map(|o| o.len() == 1).unwrap_or(false);
            if !ok {
                return Err(ValidationError::where_clause(
                    "NOT must be an object with exactly one key",
                ));
            }
            let inner = validate_clause(val, refs)?;
            Ok(Filter::Not(Box::new(inner)))
        }
        "LT" => validate_comparison(CompareOp::Lt, val, refs),
        "GT" => validate_comparison(CompareOp::Gt, val, refs),
        "EQ" => validate_comparison(CompareOp::Eq, val, refs),
        "IS" => validate_is(val, refs),
        other => Err(ValidationError::where_clause(format!(
            "Unknown WHERE operator \"{other}\""
        ))),
    }
}

fn validate_logical(
    op: &str,
    val: &Value,
    refs: &mut Vec<KeyRef>,
) -> ValidationResult<Vec<Filter>> {
    let arr = match val.as_array() {
        Some(arr) if !arr.is_empty() => arr,
        _ => {
            return Err(ValidationError::where_clause(format!(
                "{op} must be a non-empty array"
            )))
        }
    };
    arr.iter().map(|sub| validate_clause(sub, refs)).collect()
}

fn single_entry(val: &Value) -> Option<(&String, &Value)> {
    let obj = val.as_object()?;
    if obj.len() != 1 {
        return None;
    }
    obj.iter().next()
}

fn validate_comparison(
    op: CompareOp,
    val: &Value,
    refs: &mut Vec<KeyRef>,
) -> ValidationResult<Filter> {
    let (key, bound) = single_entry(val).ok_or_else(|| {
        ValidationError::where_clause(format!(
            "{} must be an object with exactly one key",
            op.as_str()
        ))
    })?;

    let key_ref = classify(key)?;
    if field_type(key_ref.kind, &key_ref.field) != Some(FieldType::Numeric) {
        return Err(ValidationError::where_clause(format!(
            "{} requires a numeric field; \"{}\" is not numeric",
            op.as_str(),
            key_ref.field
        )));
    }

    let value = bound.as_f64().ok_or_else(|| {
        ValidationError::where_clause(format!("{} value must be a number", op.as_str()))
    })?;

    refs.push(key_ref);
    Ok(Filter::Compare {
        op,
        key: key.clone(),
        value,
    })
}

fn validate_is(val: &Value, refs: &mut Vec<KeyRef>) -> ValidationResult<Filter> {
    let (key, pattern) = single_entry(val)
        .ok_or_else(|| ValidationError::where_clause("IS must be an object with exactly one key"))?;

    let key_ref = classify(key)?;
    if field_type(key_ref.kind, &key_ref.field) != Some(FieldType::String) {
        return Err(ValidationError::where_clause(format!(
            "IS requires a string field; \"{}\" is not string",
            key_ref.field
        )));
    }

    let pattern = pattern
        .as_str()
        .ok_or_else(|| ValidationError::where_clause("IS value must be a string"))?;
    let pattern = WildcardPattern::compile(pattern)?;

    refs.push(key_ref);
    Ok(Filter::Is {
        key: key.clone(),
        pattern,
    })
}
