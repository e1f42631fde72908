//! Field tables for the two record kinds
//!
//! Records are flat maps from field name to number | string. A dataset is
//! homogeneous in kind, and the kind determines which fields exist and
//! whether each is numeric or string-typed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two supported record kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    /// Course-offering rows
    Sections,
    /// Campus-room rows
    Rooms,
}

impl DatasetKind {
    /// Returns the kind name as it appears in persisted datasets
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Sections => "sections",
            DatasetKind::Rooms => "rooms",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Value type of a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// JSON number
    Numeric,
    /// JSON string
    String,
}

const SECTION_NUMERIC_FIELDS: &[&str] = &["avg", "pass", "fail", "audit", "year"];
const SECTION_STRING_FIELDS: &[&str] = &["dept", "id", "instructor", "title", "uuid"];

const ROOM_NUMERIC_FIELDS: &[&str] = &["lat", "lon", "seats"];
const ROOM_STRING_FIELDS: &[&str] = &[
    "fullname",
    "shortname",
    "number",
    "name",
    "address",
    "type",
    "furniture",
    "href",
];

/// Returns the type of `field` for the given kind, or None if the field
/// does not belong to that kind.
pub fn field_type(kind: DatasetKind, field: &str) -> Option<FieldType> {
    let (numeric, string) = match kind {
        DatasetKind::Sections => (SECTION_NUMERIC_FIELDS, SECTION_STRING_FIELDS),
        DatasetKind::Rooms => (ROOM_NUMERIC_FIELDS, ROOM_STRING_FIELDS),
    };
    if numeric.contains(&field) {
        Some(FieldType::Numeric)
    } else if string.contains(&field) {
        Some(FieldType::String)
    } else {
        None
    }
}

/// Infers the record kind a bare field name belongs to.
///
/// The two field-name sets are disjoint, so inference is unambiguous for
/// any known field; sections is checked first and wins a hypothetical tie.
pub fn infer_kind(field: &str) -> Option<DatasetKind> {
    if field_type(DatasetKind::Sections, field).is_some() {
        Some(DatasetKind::Sections)
    } else if field_type(DatasetKind::Rooms, field).is_some() {
        Some(DatasetKind::Rooms)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_field_types() {
        assert_eq!(
            field_type(DatasetKind::Sections, "avg"),
            Some(FieldType::Numeric)
        );
        assert_eq!(
            field_type(DatasetKind::Sections, "dept"),
            Some(FieldType::String)
        );
        assert_eq!(field_type(DatasetKind::Sections, "seats"), None);
    }

    #[test]
    fn test_room_field_types() {
        assert_eq!(
            field_type(DatasetKind::Rooms, "seats"),
            Some(FieldType::Numeric)
        );
        assert_eq!(
            field_type(DatasetKind::Rooms, "furniture"),
            Some(FieldType::String)
        );
        assert_eq!(field_type(DatasetKind::Rooms, "avg"), None);
    }

    #[test]
    fn test_kind_inference() {
        assert_eq!(infer_kind("pass"), Some(DatasetKind::Sections));
        assert_eq!(infer_kind("href"), Some(DatasetKind::Rooms));
        assert_eq!(infer_kind("unknown"), None);
    }

    #[test]
    fn test_field_sets_are_disjoint() {
        for &field in SECTION_NUMERIC_FIELDS.iter().chain(SECTION_STRING_FIELDS) {
            assert_eq!(field_type(DatasetKind::Rooms, field), None);
        }
        for &field in ROOM_NUMERIC_FIELDS.iter().chain(ROOM_STRING_FIELDS) {
            assert_eq!(field_type(DatasetKind::Sections, field), None);
        }
    }

    #[test]
    fn test_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&DatasetKind::Sections).unwrap(),
            "\"sections\""
        );
        assert_eq!(
            serde_json::from_str::<DatasetKind>("\"rooms\"").unwrap(),
            DatasetKind::Rooms
        );
    }
}
