//! Dataset schema registry
//!
//! Static knowledge of the two record kinds and their field sets:
//! - Which fields are numeric vs string for "sections" and "rooms"
//! - Kind inference from a bare field name
//! - Dataset key classification (`<id>_<field>`)

mod errors;
mod fields;
mod key;

pub use errors::{KeyError, KeyResult};
pub use fields::{field_type, infer_kind, DatasetKind, FieldType};
pub use key::{classify, split_key, KeyRef};
