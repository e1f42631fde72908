//! Grouping and APPLY aggregation
//!
//! Partitions filtered records into groups keyed by the tuple of GROUP
//! field values, then computes one value per APPLY rule per group:
//!
//! - MAX/MIN pick among the numeric values; non-numeric values are
//!   skipped rather than raised, since data quality problems degrade
//!   locally, never abort a query
//! - SUM/AVG accumulate as exact decimals and round to 2 places half-up
//! - COUNT counts distinct values with type-aware identity, so the
//!   number 1 and the string "1" stay distinct

use std::collections::{HashMap, HashSet};

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{Number, Value};

use crate::dataset::{resolve_field, Record};
use crate::query::{ApplyRule, ApplyToken, Transformations};

/// Groups records and computes APPLY values
pub struct GroupAggregator;

impl GroupAggregator {
    /// Produces one output row per group: the GROUP key fields merged
    /// with every computed apply value. Groups appear in first-seen
    /// order; callers needing a particular order sort afterwards.
    pub fn transform(
        rows: &[&Record],
        transformations: &Transformations,
        dataset_id: &str,
    ) -> Vec<Record> {
        let groups = Self::group(rows, &transformations.group, dataset_id);

        groups
            .into_iter()
            .map(|(tuple, members)| {
                let mut out = Record::new();
                for (key, value) in transformations.group.iter().zip(tuple) {
                    out.insert(key.clone(), value);
                }
                for rule in &transformations.apply {
                    out.insert(
                        rule.apply_key.clone(),
                        Self::compute(rule, &members, dataset_id),
                    );
                }
                out
            })
            .collect()
    }

    /// Partitions rows by the tuple of resolved group-key values.
    /// Tuples compare structurally; a missing value behaves like null.
    fn group<'a>(
        rows: &[&'a Record],
        group_keys: &[String],
        dataset_id: &str,
    ) -> Vec<(Vec<Value>, Vec<&'a Record>)> {
        let mut groups: Vec<(Vec<Value>, Vec<&Record>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for &row in rows {
            let tuple: Vec<Value> = group_keys
                .iter()
                .map(|key| {
                    resolve_field(row, key, dataset_id)
                        .cloned()
                        .unwrap_or(Value::Null)
                })
                .collect();
            let identity = group_identity(&tuple);

            match index.get(&identity) {
                Some(&slot) => groups[slot].1.push(row),
                None => {
                    index.insert(identity, groups.len());
                    groups.push((tuple, vec![row]));
                }
            }
        }

        groups
    }

    fn compute(rule: &ApplyRule, rows: &[&Record], dataset_id: &str) -> Value {
        match rule.token {
            ApplyToken::Max => Self::extreme(rows, &rule.field_key, dataset_id, true),
            ApplyToken::Min => Self::extreme(rows, &rule.field_key, dataset_id, false),
            ApplyToken::Sum => Self::precise_sum(rows, &rule.field_key, dataset_id),
            ApplyToken::Avg => Self::precise_avg(rows, &rule.field_key, dataset_id),
            ApplyToken::Count => {
                let count = Self::count_distinct(rows, &rule.field_key, dataset_id);
                Value::Number(Number::from(count as u64))
            }
        }
    }

    /// Largest (or smallest) numeric value, returned verbatim so an
    /// integer stays an integer. A group with zero numeric values yields
    /// null: the infinity sentinel has no JSON representation, and null
    /// is exactly what it becomes on the wire.
    fn extreme(rows: &[&Record], key: &str, dataset_id: &str, largest: bool) -> Value {
        let mut best: Option<(f64, &Value)> = None;
        for &row in rows {
            let Some(value) = resolve_field(row, key, dataset_id) else {
                continue;
            };
            let Some(numeric) = value.as_f64() else {
                continue;
            };
            let replace = match best {
                None => true,
                Some((incumbent, _)) => {
                    if largest {
                        numeric > incumbent
                    } else {
                        numeric < incumbent
                    }
                }
            };
            if replace {
                best = Some((numeric, value));
            }
        }
        best.map(|(_, value)| value.clone()).unwrap_or(Value::Null)
    }

    /// Exact decimal sum, rounded to 2 places half-up.
    fn precise_sum(rows: &[&Record], key: &str, dataset_id: &str) -> Value {
        let mut acc = Decimal::ZERO;
        for value in Self::numeric_values(rows, key, dataset_id) {
            if let Some(decimal) = Decimal::from_f64(value) {
                acc += decimal;
            }
        }
        decimal_value(acc.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Exact decimal mean over the numeric values, rounded to 2 places
    /// half-up; 0 when the group has no numeric values.
    fn precise_avg(rows: &[&Record], key: &str, dataset_id: &str) -> Value {
        let mut acc = Decimal::ZERO;
        let mut count: i64 = 0;
        for value in Self::numeric_values(rows, key, dataset_id) {
            if let Some(decimal) = Decimal::from_f64(value) {
                acc += decimal;
                count += 1;
            }
        }
        if count == 0 {
            return Value::Number(Number::from(0));
        }
        let avg = acc / Decimal::from(count);
        decimal_value(avg.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    fn numeric_values<'a>(
        rows: &'a [&Record],
        key: &'a str,
        dataset_id: &'a str,
    ) -> impl Iterator<Item = f64> + 'a {
        rows.iter()
            .filter_map(move |row| resolve_field(row, key, dataset_id).and_then(Value::as_f64))
    }

    /// Distinct values of any type, keyed by (runtime type, canonical
    /// string); missing values count once as their own bucket.
    fn count_distinct(rows: &[&Record], key: &str, dataset_id: &str) -> usize {
        let mut seen: HashSet<String> = HashSet::new();
        for &row in rows {
            seen.insert(distinct_identity(resolve_field(row, key, dataset_id)));
        }
        seen.len()
    }
}

/// Identity string for one group tuple. Numbers are canonicalized so 85
/// and 85.0 land in the same group.
fn group_identity(tuple: &[Value]) -> String {
    let mut identity = String::new();
    for value in tuple {
        identity.push_str(&value_identity(value));
        identity.push('\u{1f}');
    }
    identity
}

fn value_identity(value: &Value) -> String {
    match value {
        Value::Number(n) => format!("n:{}", canonical_number(n)),
        Value::String(s) => format!("s:{s}"),
        Value::Bool(b) => format!("b:{b}"),
        Value::Null => "null".to_string(),
        other => format!("j:{other}"),
    }
}

/// COUNT identity mirrors loose runtime typing: the type tag keeps 1 and
/// "1" apart, while a missing value is its own single bucket.
fn distinct_identity(value: Option<&Value>) -> String {
    match value {
        None => "undefined::undefined".to_string(),
        Some(Value::Number(n)) => format!("number::{}", canonical_number(n)),
        Some(Value::String(s)) => format!("string::{s}"),
        Some(Value::Bool(b)) => format!("boolean::{b}"),
        Some(Value::Null) => "object::null".to_string(),
        Some(other) => format!("object::{other}"),
    }
}

/// Canonical text for a JSON number: integral values print without a
/// fractional part regardless of how they were parsed.
fn canonical_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 9.007_199_254_740_992e15 => {
            format!("{}", f as i64)
        }
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Integral decimals become JSON integers; everything else a float.
fn decimal_value(decimal: Decimal) -> Value {
    if decimal.is_integer() {
        if let Some(i) = decimal.to_i64() {
            return Value::Number(Number::from(i));
        }
    }
    match decimal.to_f64().and_then(Number::from_f64) {
        Some(n) => Value::Number(n),
        None => Value::Null,
    }
}
