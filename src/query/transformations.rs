//! TRANSFORMATIONS validation (GROUP and APPLY)
//!
//! GROUP keys must all belong to one dataset id and kind; APPLY rules get
//! a shape check (one apply key, no underscore, unique), one operator
//! token, a same-dataset reference key, and the numeric-field requirement
//! for MAX/MIN/SUM/AVG.

use serde_json::Value;

use crate::schema::{classify, field_type, DatasetKind, FieldType};

use super::ast::{ApplyRule, ApplyToken, Transformations};
use super::errors::{ValidationError, ValidationResult};

/// TRANSFORMATIONS after validation, carrying its resolved dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ValidatedTransformations {
    pub transformations: Transformations,
    pub dataset_id: String,
    pub kind: DatasetKind,
}

pub(crate) fn validate_transformations(
    value: &Value,
) -> ValidationResult<ValidatedTransformations> {
    let obj = value
        .as_object()
        .ok_or_else(|| ValidationError::transformations("TRANSFORMATIONS must be an object"))?;

    let (group, dataset_id, kind) = validate_group(obj.get("GROUP"))?;
    let apply = validate_apply(obj.get("APPLY"), &dataset_id)?;

    Ok(ValidatedTransformations {
        transformations: Transformations { group, apply },
        dataset_id,
        kind,
    })
}

fn validate_group(
    group: Option<&Value>,
) -> ValidationResult<(Vec<String>, String, DatasetKind)> {
    let arr = match group.and_then(Value::as_array) {
        Some(arr) if !arr.is_empty() => arr,
        _ => {
            return Err(ValidationError::transformations(
                "TRANSFORMATIONS.GROUP must be a non-empty array",
            ))
        }
    };

    let mut keys = Vec::with_capacity(arr.len());
    let mut ids = Vec::new();
    let mut kinds = Vec::new();
    for entry in arr {
        let key = entry.as_str().ok_or_else(|| {
            ValidationError::transformations("GROUP entries must be dataset keys")
        })?;
        let key_ref = classify(key)?;
        if !ids.contains(&key_ref.id) {
            ids.push(key_ref.id.clone());
        }
        if !kinds.contains(&key_ref.kind) {
            kinds.push(key_ref.kind);
        }
        keys.push(key.to_string());
    }

    if ids.len() != 1 {
        return Err(ValidationError::transformations(
            "GROUP keys must use the same dataset id",
        ));
    }
    if kinds.len() != 1 {
        return Err(ValidationError::transformations(
            "GROUP keys must all be of the same dataset kind",
        ));
    }

    Ok((keys, ids.remove(0), kinds[0]))
}

fn validate_apply(apply: Option<&Value>, dataset_id: &str) -> ValidationResult<Vec<ApplyRule>> {
    let arr = apply.and_then(Value::as_array).ok_or_else(|| {
        ValidationError::transformations("TRANSFORMATIONS.APPLY must be an array")
    })?;

    let mut rules: Vec<ApplyRule> = Vec::with_capacity(arr.len());
    for rule in arr {
        let rule = validate_apply_rule(rule, dataset_id, &rules)?;
        rules.push(rule);
    }
    Ok(rules)
}

fn validate_apply_rule(
    rule: &Value,
    dataset_id: &str,
    seen: &[ApplyRule],
) -> ValidationResult<ApplyRule> {
    let obj = rule.as_object().filter(|o| o.len() == 1).ok_or_else(|| {
        ValidationError::transformations("APPLY rule must define exactly one applyKey")
    })?;
    let (apply_key, inner) = obj.iter().next().expect("rule has exactly one key");

    if apply_key.contains('_') {
        return Err(ValidationError::transformations(
            "APPLY key contains underscore",
        ));
    }
    if seen.iter().any(|r| &r.apply_key == apply_key) {
        return Err(ValidationError::transformations("Duplicate apply key"));
    }

    let inner_obj = inner.as_object().ok_or_else(|| {
        ValidationError::transformations(format!(
            "APPLY \"{apply_key}\" must map to an operator object"
        ))
    })?;
    if inner_obj.len() != 1 {
        return Err(ValidationError::transformations(format!(
            "APPLY \"{apply_key}\" must contain exactly one operator"
        )));
    }
    let (token_name, field_key) = inner_obj.iter().next().expect("operator object has one key");

    let field_key = field_key.as_str().ok_or_else(|| {
        ValidationError::transformations(format!(
            "APPLY token reference for \"{apply_key}\" must be a string"
        ))
    })?;

    let key_ref = classify(field_key)?;
    if key_ref.id != dataset_id {
        return Err(ValidationError::transformations(
            "APPLY field uses different dataset id",
        ));
    }

    let token = ApplyToken::parse(token_name).ok_or_else(|| {
        ValidationError::transformations(format!("Unknown APPLY token \"{token_name}\""))
    })?;
    if token.requires_numeric()
        && field_type(key_ref.kind, &key_ref.field) != Some(FieldType::Numeric)
    {
        return Err(ValidationError::transformations(format!(
            "{} requires a numeric field; \"{}\" is not numeric",
            token.as_str(),
            key_ref.field
        )));
    }

    Ok(ApplyRule {
        apply_key: apply_key.clone(),
        token,
        field_key: field_key.to_string(),
    })
}
