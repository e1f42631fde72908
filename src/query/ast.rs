//! Typed query representation
//!
//! The validator parses an untyped JSON query into these types; nothing
//! downstream of validation re-inspects untyped shapes. The filter tree
//! is a sum type with exhaustive matching rather than one-key-object
//! dispatch.

use regex::Regex;

use crate::schema::DatasetKind;

use super::errors::{ValidationError, ValidationResult};

/// Numeric comparison operators (LT / GT / EQ)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Gt,
    Eq,
}

impl CompareOp {
    /// Returns the operator name as it appears in queries
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Lt => "LT",
            CompareOp::Gt => "GT",
            CompareOp::Eq => "EQ",
        }
    }
}

/// A wildcard string pattern for the IS operator.
///
/// `*` matches zero or more characters and may appear only as a run at
/// the start and/or end of the pattern; every other character matches
/// literally. Compiled once at validation time to an anchored regex with
/// the literal portion escaped.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    raw: String,
    regex: Regex,
}

impl WildcardPattern {
    /// Compiles a pattern, rejecting interior wildcards.
    pub fn compile(raw: &str) -> ValidationResult<Self> {
        let stripped = raw.trim_matches('*');
        if stripped.contains('*') {
            return Err(ValidationError::where_clause(
                "IS string cannot contain wildcard in the middle",
            ));
        }

        let mut source = String::with_capacity(raw.len() + 4);
        source.push('^');
        for ch in raw.chars() {
            if ch == '*' {
                source.push_str(".*");
            } else {
                source.push_str(&regex::escape(&ch.to_string()));
            }
        }
        source.push('$');

        // The source is built from an escaped literal plus ".*" runs, so
        // compilation cannot fail on user input.
        let regex = Regex::new(&source)
            .map_err(|e| ValidationError::where_clause(format!("IS pattern is invalid: {e}")))?;

        Ok(Self {
            raw: raw.to_string(),
            regex,
        })
    }

    /// Returns true if the full string matches the pattern.
    pub fn matches(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    /// Returns the original pattern text
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl PartialEq for WildcardPattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for WildcardPattern {}

/// A validated WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// The empty clause: matches every record
    All,
    /// All sub-clauses must match
    And(Vec<Filter>),
    /// At least one sub-clause must match
    Or(Vec<Filter>),
    /// The sub-clause must not match
    Not(Box<Filter>),
    /// Numeric comparison on a dataset key
    Compare {
        op: CompareOp,
        key: String,
        value: f64,
    },
    /// Wildcard string match on a dataset key
    Is {
        key: String,
        pattern: WildcardPattern,
    },
}

/// Sort direction for the ORDER clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Up,
    Down,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Up => "UP",
            SortDirection::Down => "DOWN",
        }
    }
}

/// A validated ORDER clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderSpec {
    /// Single key, ascending
    Single(String),
    /// Multi-key with an explicit direction applied to every key
    Directed {
        dir: SortDirection,
        keys: Vec<String>,
    },
}

impl OrderSpec {
    /// Returns the order keys in comparison order
    pub fn keys(&self) -> &[String] {
        match self {
            OrderSpec::Single(key) => std::slice::from_ref(key),
            OrderSpec::Directed { keys, .. } => keys,
        }
    }
}

/// Aggregation operators for APPLY rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyToken {
    Max,
    Min,
    Avg,
    Sum,
    Count,
}

impl ApplyToken {
    /// Parses a token name, returning None for unknown tokens
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "MAX" => Some(ApplyToken::Max),
            "MIN" => Some(ApplyToken::Min),
            "AVG" => Some(ApplyToken::Avg),
            "SUM" => Some(ApplyToken::Sum),
            "COUNT" => Some(ApplyToken::Count),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplyToken::Max => "MAX",
            ApplyToken::Min => "MIN",
            ApplyToken::Avg => "AVG",
            ApplyToken::Sum => "SUM",
            ApplyToken::Count => "COUNT",
        }
    }

    /// Returns true if the token only accepts numeric fields
    pub fn requires_numeric(&self) -> bool {
        !matches!(self, ApplyToken::Count)
    }
}

/// One APPLY rule: `{ <applyKey>: { <TOKEN>: <datasetKey> } }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyRule {
    /// Output column name (no underscore, unique within APPLY)
    pub apply_key: String,
    /// Aggregation operator
    pub token: ApplyToken,
    /// Dataset key the aggregate reads
    pub field_key: String,
}

/// A validated TRANSFORMATIONS clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformations {
    /// Grouping keys, in grouping order
    pub group: Vec<String>,
    /// Apply rules, in declaration order
    pub apply: Vec<ApplyRule>,
}

/// A fully validated query, resolved to a single dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// The one dataset id the query references
    pub dataset_id: String,
    /// Record kind of that dataset
    pub kind: DatasetKind,
    /// WHERE clause
    pub filter: Filter,
    /// Output columns, in projection order
    pub columns: Vec<String>,
    /// Optional sort specification
    pub order: Option<OrderSpec>,
    /// Optional grouping and aggregation
    pub transformations: Option<Transformations>,
}

impl Query {
    /// Returns true if the WHERE clause is the empty match-all clause
    pub fn is_match_all(&self) -> bool {
        self.filter == Filter::All
    }
}
