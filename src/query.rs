//! Predicate parsing for job filtering
//!
//! Filters are written as textual keys in the `field__operator` convention:
//! a bare field name tests equality, and a recognized suffix after the `__`
//! separator selects a different comparison. All predicates supplied to one
//! [`filter`](crate::experiment::JobCollection::filter) call are combined
//! with logical AND.
//!
//! ## Supported operators
//!
//! | Key            | Meaning                                   |
//! |----------------|-------------------------------------------|
//! | `field`        | equality                                  |
//! | `field__contains` | substring (strings) / membership (arrays, object keys) |
//! | `field__gt`    | greater than                              |
//! | `field__lt`    | less than                                 |
//! | `field__gte`   | greater than or equal                     |
//! | `field__lte`   | less than or equal                        |
//!
//! An unrecognized suffix does not fail: the whole key (suffix included) is
//! treated as a field name and tested for equality. A typo such as
//! `name__unknownop` therefore matches nothing unless a parameter literally
//! named `name__unknownop` exists.

use serde_json::Value;
use std::cmp::Ordering;

/// Separator between a field name and an operator suffix.
pub const OPERATOR_SEPARATOR: &str = "__";

/// Comparison applied by one predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Exact equality (numbers compare numerically)
    Eq,
    /// Substring test on strings, membership on arrays and object keys
    Contains,
    /// Greater than
    Gt,
    /// Less than
    Lt,
    /// Greater than or equal
    Gte,
    /// Less than or equal
    Lte,
}

impl FilterOp {
    /// Map an operator suffix to its comparison, or `None` for an
    /// unrecognized suffix.
    #[must_use]
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "contains" => Some(Self::Contains),
            "gt" => Some(Self::Gt),
            "lt" => Some(Self::Lt),
            "gte" => Some(Self::Gte),
            "lte" => Some(Self::Lte),
            _ => None,
        }
    }
}

/// A single parsed filter: field, comparison, and expected value.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    field: String,
    op: FilterOp,
    value: Value,
}

impl Predicate {
    /// Build a predicate from an explicit field, operator, and value.
    #[must_use]
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Parse a textual filter key into a predicate.
    ///
    /// The key is split once from the left on `__`. A recognized suffix
    /// selects its operator; an unrecognized suffix degrades to an equality
    /// test against the literal key, suffix and all. This fallback is
    /// deliberate: it preserves filtering on parameters whose names happen
    /// to contain `__`, at the cost of silently accepting operator typos.
    ///
    /// # Example
    ///
    /// ```
    /// use repx_meta::query::{FilterOp, Predicate};
    ///
    /// let p = Predicate::parse("name__contains", "producer");
    /// assert_eq!(p.field(), "name");
    /// assert_eq!(p.op(), FilterOp::Contains);
    ///
    /// let p = Predicate::parse("name__unknownop", "producer");
    /// assert_eq!(p.field(), "name__unknownop");
    /// assert_eq!(p.op(), FilterOp::Eq);
    /// ```
    #[must_use]
    pub fn parse(key: &str, value: impl Into<Value>) -> Self {
        let (field, op) = match key.split_once(OPERATOR_SEPARATOR) {
            Some((field, suffix)) => match FilterOp::from_suffix(suffix) {
                Some(op) => (field.to_string(), op),
                None => (key.to_string(), FilterOp::Eq),
            },
            None => (key.to_string(), FilterOp::Eq),
        };
        Self {
            field,
            op,
            value: value.into(),
        }
    }

    /// Field this predicate reads from a job view.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Comparison this predicate applies.
    #[must_use]
    pub fn op(&self) -> FilterOp {
        self.op
    }

    /// Expected value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Evaluate the predicate against a field value looked up on a view.
    ///
    /// `None` (field undefined on the job) never matches.
    #[must_use]
    pub fn matches(&self, candidate: Option<&Value>) -> bool {
        let Some(candidate) = candidate else {
            return false;
        };
        match self.op {
            FilterOp::Eq => values_equal(candidate, &self.value),
            FilterOp::Contains => value_contains(candidate, &self.value),
            FilterOp::Gt => matches!(compare_values(candidate, &self.value), Some(Ordering::Greater)),
            FilterOp::Lt => matches!(compare_values(candidate, &self.value), Some(Ordering::Less)),
            FilterOp::Gte => matches!(
                compare_values(candidate, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::Lte => matches!(
                compare_values(candidate, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }
}

/// Equality with numeric loosening: `7` and `7.0` are the same parameter
/// value even though their JSON representations differ.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Containment: substring for strings, element membership for arrays, key
/// membership for objects. Anything else never contains.
fn value_contains(candidate: &Value, needle: &Value) -> bool {
    match candidate {
        Value::String(s) => needle.as_str().is_some_and(|n| s.contains(n)),
        Value::Array(items) => items.iter().any(|item| values_equal(item, needle)),
        Value::Object(map) => needle.as_str().is_some_and(|n| map.contains_key(n)),
        _ => false,
    }
}

/// Ordering for the comparison operators: numbers compare numerically,
/// strings lexicographically, mixed or unordered types not at all.
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return x.partial_cmp(&y);
    }
    if let (Some(x), Some(y)) = (a.as_str(), b.as_str()) {
        return Some(x.cmp(y));
    }
    None
}
