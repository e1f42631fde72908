//! Deterministic result sorting
//!
//! Sorts projected rows by the ORDER clause. The sort is stable: rows
//! that compare equal on every key keep their original relative order.
//! A single string key sorts ascending; the `{dir, keys}` form compares
//! key by key with the direction applied uniformly to every comparison,
//! including the absent-value rule.

use std::cmp::Ordering;

use serde_json::Value;

use crate::dataset::Record;
use crate::query::{OrderSpec, SortDirection};

/// Sorts projected result rows
pub struct ResultSorter;

impl ResultSorter {
    /// Sorts rows in place according to the ORDER clause. Rows are
    /// already projected, so order keys look up column names directly.
    pub fn sort(rows: &mut [Record], order: &OrderSpec) {
        match order {
            OrderSpec::Single(key) => {
                rows.sort_by(|a, b| {
                    Self::compare_values(a.get(key), b.get(key), SortDirection::Up)
                });
            }
            OrderSpec::Directed { dir, keys } => {
                rows.sort_by(|a, b| {
                    for key in keys {
                        let ordering = Self::compare_values(a.get(key), b.get(key), *dir);
                        if ordering != Ordering::Equal {
                            return ordering;
                        }
                    }
                    Ordering::Equal
                });
            }
        }
    }

    /// Compares two optional values under a direction. Absent values are
    /// "worse" in ascending terms: they sort after present values under
    /// UP and before them under DOWN.
    fn compare_values(a: Option<&Value>, b: Option<&Value>, dir: SortDirection) -> Ordering {
        let ordering = match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => Self::compare_present(a, b),
        };
        match dir {
            SortDirection::Up => ordering,
            SortDirection::Down => ordering.reverse(),
        }
    }

    /// Values of the same type order naturally; values of different
    /// types are incomparable and tie.
    fn compare_present(a: &Value, b: &Value) -> Ordering {
        match (a, b) {
            (Value::Number(x), Value::Number(y)) => {
                let x = x.as_f64().unwrap_or(0.0);
                let y = y.as_f64().unwrap_or(0.0);
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
            (Value::String(x), Value::String(y)) => x.cmp(y),
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            _ => Ordering::Equal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(values: serde_json::Value) -> Vec<Record> {
        values
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    fn ids(rows: &[Record]) -> Vec<i64> {
        rows.iter().map(|r| r["id"].as_i64().unwrap()).collect()
    }

    #[test]
    fn test_single_key_sorts_ascending() {
        let mut r = rows(json!([
            {"id": 1, "avg": 90},
            {"id": 2, "avg": 70},
            {"id": 3, "avg": 80}
        ]));
        ResultSorter::sort(&mut r, &OrderSpec::Single("avg".into()));
        assert_eq!(ids(&r), [2, 3, 1]);
    }

    #[test]
    fn test_down_direction_applies_to_every_key() {
        let mut r = rows(json!([
            {"id": 1, "d": "cpsc", "a": 90},
            {"id": 2, "d": "cpsc", "a": 90},
            {"id": 3, "d": "cpsc", "a": 80},
            {"id": 4, "d": "math", "a": 95}
        ]));
        ResultSorter::sort(
            &mut r,
            &OrderSpec::Directed {
                dir: SortDirection::Down,
                keys: vec!["a".into(), "d".into()],
            },
        );
        assert_eq!(ids(&r), [4, 1, 2, 3]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let mut r = rows(json!([
            {"id": 1, "avg": 85},
            {"id": 2, "avg": 85},
            {"id": 3, "avg": 85}
        ]));
        ResultSorter::sort(&mut r, &OrderSpec::Single("avg".into()));
        assert_eq!(ids(&r), [1, 2, 3]);
    }

    #[test]
    fn test_absent_values_sort_last_under_up() {
        let mut r = rows(json!([
            {"id": 1},
            {"id": 2, "avg": 70},
            {"id": 3, "avg": 90}
        ]));
        ResultSorter::sort(&mut r, &OrderSpec::Single("avg".into()));
        assert_eq!(ids(&r), [2, 3, 1]);
    }

    #[test]
    fn test_absent_values_sort_first_under_down() {
        let mut r = rows(json!([
            {"id": 1, "avg": 70},
            {"id": 2},
            {"id": 3, "avg": 90}
        ]));
        ResultSorter::sort(
            &mut r,
            &OrderSpec::Directed {
                dir: SortDirection::Down,
                keys: vec!["avg".into()],
            },
        );
        assert_eq!(ids(&r), [2, 3, 1]);
    }

    #[test]
    fn test_string_keys_sort_lexicographically() {
        let mut r = rows(json!([
            {"id": 1, "dept": "math"},
            {"id": 2, "dept": "biol"},
            {"id": 3, "dept": "cpsc"}
        ]));
        ResultSorter::sort(&mut r, &OrderSpec::Single("dept".into()));
        assert_eq!(ids(&r), [2, 3, 1]);
    }
}
