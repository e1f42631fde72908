//! Raw course-row conversion
//!
//! Course archives deliver section rows with upstream field names
//! (Subject, Course, Avg, Professor, ...). A provider maps each row to
//! the flat section record the engine queries. Malformed rows are
//! skipped, never errors: real archives carry junk.

use serde_json::{Number, Value};

use super::Record;

/// Sections marked "overall" aggregate every offering year and are
/// pinned to this placeholder year.
const OVERALL_SECTION_YEAR: i64 = 1900;

/// Converts one raw course row into a flat section record.
///
/// Returns None when the row does not carry the expected fields with the
/// expected types. The `id` field may arrive as a string or a number and
/// becomes the string `uuid`; `Year` may arrive as a string or a number
/// and becomes the numeric `year`, forced to 1900 for "overall" rows.
pub fn section_from_raw(raw: &Value) -> Option<Record> {
    let obj = raw.as_object()?;

    let dept = obj.get("Subject")?.as_str()?;
    let id = obj.get("Course")?.as_str()?;
    let avg = obj.get("Avg")?.as_f64()?;
    let instructor = obj.get("Professor")?.as_str()?;
    let title = obj.get("Title")?.as_str()?;
    let pass = obj.get("Pass")?.as_f64()?;
    let fail = obj.get("Fail")?.as_f64()?;
    let audit = obj.get("Audit")?.as_f64()?;

    let uuid = match obj.get("id")? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    let section = obj.get("Section")?.as_str()?;
    let year = if section == "overall" {
        OVERALL_SECTION_YEAR as f64
    } else {
        match obj.get("Year")? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        }
    };

    let mut record = Record::new();
    record.insert("dept".into(), Value::String(dept.to_string()));
    record.insert("id".into(), Value::String(id.to_string()));
    record.insert("avg".into(), number_value(avg));
    record.insert("instructor".into(), Value::String(instructor.to_string()));
    record.insert("title".into(), Value::String(title.to_string()));
    record.insert("pass".into(), number_value(pass));
    record.insert("fail".into(), number_value(fail));
    record.insert("audit".into(), number_value(audit));
    record.insert("uuid".into(), Value::String(uuid));
    record.insert("year".into(), number_value(year));
    Some(record)
}

/// Converts a parsed course file (`{"result": [...]}`) into section
/// records, skipping rows that fail the shape check.
pub fn sections_from_result(file: &Value) -> Vec<Record> {
    match file.get("result").and_then(Value::as_array) {
        Some(rows) => rows.iter().filter_map(section_from_raw).collect(),
        None => Vec::new(),
    }
}

/// Integral values stay JSON integers so they round-trip as the archive
/// wrote them.
fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::Number(Number::from(value as i64))
    } else {
        Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
    }
}
