//! OPTIONS validation (COLUMNS and ORDER)

use serde_json::Value;

use super::ast::{OrderSpec, SortDirection};
use super::errors::{ValidationError, ValidationResult};

/// OPTIONS after shape validation, before cross-reference checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawOptions {
    pub columns: Vec<String>,
    pub order: Option<OrderSpec>,
}

/// Validates the OPTIONS object shape.
///
/// The "ORDER keys appear in COLUMNS" rule is deferred to the validator's
/// cross-reference stage.
pub(crate) fn validate_options(options: &Value) -> ValidationResult<RawOptions> {
    let obj = options
        .as_object()
        .ok_or_else(|| ValidationError::options("OPTIONS must be an object"))?;

    let columns = match obj.get("COLUMNS").and_then(Value::as_array) {
        Some(arr) if !arr.is_empty() => arr,
        _ => {
            return Err(ValidationError::options(
                "COLUMNS must be a non-empty array",
            ))
        }
    };
    let columns = columns
        .iter()
        .map(|c| {
            c.as_str()
                .map(str::to_string)
                .ok_or_else(|| ValidationError::options("COLUMNS entries must be strings"))
        })
        .collect::<ValidationResult<Vec<_>>>()?;

    let order = match obj.get("ORDER") {
        None => None,
        Some(order) => Some(validate_order(order)?),
    };

    Ok(RawOptions { columns, order })
}

fn validate_order(order: &Value) -> ValidationResult<OrderSpec> {
    if let Some(key) = order.as_str() {
        return Ok(OrderSpec::Single(key.to_string()));
    }

    let obj = order
        .as_object()
        .ok_or_else(|| ValidationError::options("ORDER must be a string or an object"))?;

    let dir = match obj.get("dir").and_then(Value::as_str) {
        Some("UP") => SortDirection::Up,
        Some("DOWN") => SortDirection::Down,
        _ => {
            return Err(ValidationError::options(
                "ORDER.dir must be \"UP\" or \"DOWN\"",
            ))
        }
    };

    let keys = match obj.get("keys").and_then(Value::as_array) {
        Some(arr) if !arr.is_empty() => arr,
        _ => {
            return Err(ValidationError::options(
                "ORDER object must use a non-empty keys array",
            ))
        }
    };
    let keys = keys
        .iter()
        .map(|k| {
            k.as_str()
                .map(str::to_string)
                .ok_or_else(|| ValidationError::options("ORDER keys must be strings"))
        })
        .collect::<ValidationResult<Vec<_>>>()?;

    Ok(OrderSpec::Directed { dir, keys })
}
