//! Query Validation Tests
//!
//! The validator rejects every grammar or schema violation before any
//! record is touched, with a message naming the violated rule:
//! - Top-level structure (WHERE/OPTIONS, no extra keys)
//! - OPTIONS shape and ORDER/COLUMNS consistency
//! - WHERE operator grammar and field typing
//! - TRANSFORMATIONS shape and APPLY constraints
//! - Single-dataset resolution

use insightdb::query::QueryValidator;
use insightdb::DatasetKind;
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn expect_rejection(query: Value, expected_message: &str) {
    let err = QueryValidator::validate(&query).unwrap_err();
    assert_eq!(err.to_string(), expected_message);
}

// =============================================================================
// Acceptance
// =============================================================================

/// The smallest well-formed query resolves its dataset.
#[test]
fn test_minimal_query_accepted() {
    let query = QueryValidator::validate(&json!({
        "WHERE": {},
        "OPTIONS": {"COLUMNS": ["courses_dept"]}
    }))
    .unwrap();
    assert_eq!(query.dataset_id, "courses");
    assert_eq!(query.kind, DatasetKind::Sections);
}

/// A query using every clause validates as a whole.
#[test]
fn test_full_query_accepted() {
    let query = QueryValidator::validate(&json!({
        "WHERE": {
            "AND": [
                {"GT": {"courses_avg": 70}},
                {"NOT": {"IS": {"courses_dept": "*math*"}}},
                {"OR": [
                    {"EQ": {"courses_year": 2015}},
                    {"LT": {"courses_fail": 10}}
                ]}
            ]
        },
        "OPTIONS": {
            "COLUMNS": ["courses_dept", "courses_year", "best", "n"],
            "ORDER": {"dir": "DOWN", "keys": ["best", "courses_dept"]}
        },
        "TRANSFORMATIONS": {
            "GROUP": ["courses_dept", "courses_year"],
            "APPLY": [
                {"best": {"MAX": "courses_avg"}},
                {"n": {"COUNT": "courses_uuid"}}
            ]
        }
    }))
    .unwrap();
    assert_eq!(query.dataset_id, "courses");
    assert_eq!(query.columns.len(), 4);
}

/// Rooms queries resolve to the rooms kind.
#[test]
fn test_rooms_query_accepted() {
    let query = QueryValidator::validate(&json!({
        "WHERE": {"GT": {"campus_seats": 100}},
        "OPTIONS": {"COLUMNS": ["campus_shortname", "campus_seats"]}
    }))
    .unwrap();
    assert_eq!(query.kind, DatasetKind::Rooms);
}

// =============================================================================
// Structure Rejections
// =============================================================================

/// A query without OPTIONS is rejected.
#[test]
fn test_missing_options_rejected() {
    expect_rejection(json!({"WHERE": {}}), "Query must have WHERE and OPTIONS");
}

/// A query without WHERE is rejected.
#[test]
fn test_missing_where_rejected() {
    expect_rejection(
        json!({"OPTIONS": {"COLUMNS": ["courses_dept"]}}),
        "Query must have WHERE and OPTIONS",
    );
}

/// Non-object queries are rejected.
#[test]
fn test_non_object_query_rejected() {
    expect_rejection(json!("WHERE"), "Query must be an object");
    expect_rejection(json!([]), "Query must be an object");
    expect_rejection(Value::Null, "Query must be an object");
}

/// Unknown top-level keys are rejected.
#[test]
fn test_unexpected_top_level_key_rejected() {
    expect_rejection(
        json!({
            "WHERE": {},
            "OPTIONS": {"COLUMNS": ["courses_dept"]},
            "GROUPING": {}
        }),
        "Query contains unexpected top-level keys",
    );
}

// =============================================================================
// WHERE Rejections
// =============================================================================

/// AND and OR require non-empty arrays.
#[test]
fn test_empty_logical_arrays_rejected() {
    expect_rejection(
        json!({
            "WHERE": {"AND": []},
            "OPTIONS": {"COLUMNS": ["courses_dept"]}
        }),
        "AND must be a non-empty array",
    );
    expect_rejection(
        json!({
            "WHERE": {"OR": []},
            "OPTIONS": {"COLUMNS": ["courses_dept"]}
        }),
        "OR must be a non-empty array",
    );
}

/// Operators outside the grammar are rejected at any depth.
#[test]
fn test_unknown_operator_rejected() {
    expect_rejection(
        json!({
            "WHERE": {"AND": [{"LIKE": {"courses_dept": "cpsc"}}]},
            "OPTIONS": {"COLUMNS": ["courses_dept"]}
        }),
        "Unknown WHERE operator \"LIKE\"",
    );
}

/// Numeric comparisons on string fields are rejected.
#[test]
fn test_comparison_field_typing() {
    expect_rejection(
        json!({
            "WHERE": {"GT": {"courses_dept": 50}},
            "OPTIONS": {"COLUMNS": ["courses_dept"]}
        }),
        "GT requires a numeric field; \"dept\" is not numeric",
    );
}

/// IS on numeric fields is rejected.
#[test]
fn test_is_field_typing() {
    expect_rejection(
        json!({
            "WHERE": {"IS": {"courses_avg": "9*"}},
            "OPTIONS": {"COLUMNS": ["courses_avg"]}
        }),
        "IS requires a string field; \"avg\" is not string",
    );
}

/// Wildcards may only lead or trail a pattern.
#[test]
fn test_interior_wildcard_rejected() {
    expect_rejection(
        json!({
            "WHERE": {"IS": {"courses_dept": "cp*c"}},
            "OPTIONS": {"COLUMNS": ["courses_dept"]}
        }),
        "IS string cannot contain wildcard in the middle",
    );
}

// =============================================================================
// OPTIONS Rejections
// =============================================================================

/// COLUMNS must be a non-empty array.
#[test]
fn test_empty_columns_rejected() {
    expect_rejection(
        json!({"WHERE": {}, "OPTIONS": {"COLUMNS": []}}),
        "COLUMNS must be a non-empty array",
    );
}

/// ORDER keys must be listed in COLUMNS, in both ORDER forms.
#[test]
fn test_order_outside_columns_rejected() {
    expect_rejection(
        json!({
            "WHERE": {},
            "OPTIONS": {"COLUMNS": ["courses_dept"], "ORDER": "courses_avg"}
        }),
        "ORDER key must also appear in OPTIONS.COLUMNS",
    );
    expect_rejection(
        json!({
            "WHERE": {},
            "OPTIONS": {
                "COLUMNS": ["courses_dept"],
                "ORDER": {"dir": "UP", "keys": ["courses_dept", "courses_avg"]}
            }
        }),
        "ORDER key must also appear in OPTIONS.COLUMNS",
    );
}

/// ORDER direction must be UP or DOWN.
#[test]
fn test_invalid_order_direction_rejected() {
    expect_rejection(
        json!({
            "WHERE": {},
            "OPTIONS": {
                "COLUMNS": ["courses_dept"],
                "ORDER": {"dir": "ASC", "keys": ["courses_dept"]}
            }
        }),
        "ORDER.dir must be \"UP\" or \"DOWN\"",
    );
}

// =============================================================================
// Dataset Resolution Rejections
// =============================================================================

/// Two dataset ids in COLUMNS cannot resolve.
#[test]
fn test_two_dataset_ids_rejected() {
    expect_rejection(
        json!({
            "WHERE": {},
            "OPTIONS": {"COLUMNS": ["courses_dept", "other_avg"]}
        }),
        "Query must reference exactly one dataset id",
    );
}

/// WHERE and TRANSFORMATIONS must agree on the dataset id.
#[test]
fn test_where_and_group_ids_must_agree() {
    expect_rejection(
        json!({
            "WHERE": {"GT": {"courses_avg": 50}},
            "OPTIONS": {"COLUMNS": ["other_dept"]},
            "TRANSFORMATIONS": {"GROUP": ["other_dept"], "APPLY": []}
        }),
        "Query must reference exactly one dataset id",
    );
}

// =============================================================================
// TRANSFORMATIONS Rejections
// =============================================================================

/// APPLY keys may not contain underscores.
#[test]
fn test_apply_key_with_underscore_rejected() {
    expect_rejection(
        json!({
            "WHERE": {},
            "OPTIONS": {"COLUMNS": ["courses_dept", "max_avg"]},
            "TRANSFORMATIONS": {
                "GROUP": ["courses_dept"],
                "APPLY": [{"max_avg": {"MAX": "courses_avg"}}]
            }
        }),
        "APPLY key contains underscore",
    );
}

/// APPLY keys must be unique.
#[test]
fn test_duplicate_apply_key_rejected() {
    expect_rejection(
        json!({
            "WHERE": {},
            "OPTIONS": {"COLUMNS": ["courses_dept", "x"]},
            "TRANSFORMATIONS": {
                "GROUP": ["courses_dept"],
                "APPLY": [
                    {"x": {"MAX": "courses_avg"}},
                    {"x": {"MIN": "courses_avg"}}
                ]
            }
        }),
        "Duplicate apply key",
    );
}

/// Numeric aggregation tokens reject string-typed fields.
#[test]
fn test_numeric_tokens_reject_string_fields() {
    for token in ["MAX", "MIN", "SUM", "AVG"] {
        let err = QueryValidator::validate(&json!({
            "WHERE": {},
            "OPTIONS": {"COLUMNS": ["courses_dept", "x"]},
            "TRANSFORMATIONS": {
                "GROUP": ["courses_dept"],
                "APPLY": [{"x": {token: "courses_instructor"}}]
            }
        }))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("{token} requires a numeric field; \"instructor\" is not numeric")
        );
    }
}

/// Raw dataset keys outside GROUP are forbidden in COLUMNS when
/// TRANSFORMATIONS is present.
#[test]
fn test_raw_column_outside_group_rejected() {
    expect_rejection(
        json!({
            "WHERE": {},
            "OPTIONS": {"COLUMNS": ["courses_dept", "courses_avg"]},
            "TRANSFORMATIONS": {
                "GROUP": ["courses_dept"],
                "APPLY": []
            }
        }),
        "COLUMNS element \"courses_avg\" is not a GROUP key or an APPLY key",
    );
}

/// GROUP must not be empty.
#[test]
fn test_empty_group_rejected() {
    expect_rejection(
        json!({
            "WHERE": {},
            "OPTIONS": {"COLUMNS": ["courses_dept"]},
            "TRANSFORMATIONS": {"GROUP": [], "APPLY": []}
        }),
        "TRANSFORMATIONS.GROUP must be a non-empty array",
    );
}
