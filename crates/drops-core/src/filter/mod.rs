//! # Filters
//!
//! Raw filter input and the registry that turns it into predicates.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      From Query String To Predicate                     │
//! │                                                                         │
//! │  ?gender=m&color[]=red&color[]=black&minPriceUSD=100&sort=new          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  FilterParams { color: List[red, black], gender: Single(m),            │
//! │                 minPriceUSD: Single(100), sort: Single(new) }          │
//! │       │                                                                 │
//! │       ▼  FilterKey::parse (unknown keys such as `sort` are skipped)    │
//! │                                                                         │
//! │  FilterKey::Color       → Release: color ~ red OR color ~ black        │
//! │  FilterKey::Gender      → Release: gender = m OR gender = u            │
//! │  FilterKey::MinPriceUsd → Release: price_usd >= 100                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ReleaseQuery (see `query` module): clauses ANDed together             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod predicate;
pub mod registry;

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::ValidationError;
use crate::validation::ValidationResult;

pub use predicate::{Column, FilterClause, Operand, Operator, Predicate, TargetEntity};
pub use registry::{FilterContext, FilterKey};

// =============================================================================
// Filter Value
// =============================================================================

/// A raw filter value: one string, or several for OR-semantics filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Single(String),
    List(Vec<String>),
}

impl FilterValue {
    /// All raw values, in input order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            FilterValue::Single(value) => vec![value.as_str()],
            FilterValue::List(values) => values.iter().map(String::as_str).collect(),
        }
    }

    /// The value of a scalar filter.
    ///
    /// A one-element list is accepted, since `key[]=x` is a common spelling
    /// of `key=x` in query strings.
    pub fn single(&self, field: &str) -> ValidationResult<&str> {
        match self {
            FilterValue::Single(value) => Ok(value),
            FilterValue::List(values) if values.len() == 1 => Ok(&values[0]),
            FilterValue::List(_) => Err(ValidationError::ExpectedSingleValue {
                field: field.to_string(),
            }),
        }
    }

    /// The values of a list filter, rejecting an empty list.
    pub fn non_empty(&self, field: &str) -> ValidationResult<Vec<&str>> {
        let values = self.values();
        if values.is_empty() {
            return Err(ValidationError::EmptyList {
                field: field.to_string(),
            });
        }
        Ok(values)
    }

    fn push(&mut self, value: String) {
        match self {
            FilterValue::Single(existing) => {
                let first = std::mem::take(existing);
                *self = FilterValue::List(vec![first, value]);
            }
            FilterValue::List(values) => values.push(value),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Single(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Single(value)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(values: Vec<&str>) -> Self {
        FilterValue::List(values.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(values: Vec<String>) -> Self {
        FilterValue::List(values)
    }
}

// =============================================================================
// Filter Params
// =============================================================================

/// Flat mapping of filter name → value(s), as received from a caller.
///
/// Keys are kept verbatim; keys the registry does not know are carried
/// along and ignored at composition time.
///
/// ## Example
/// ```rust
/// use drops_core::filter::FilterParams;
///
/// let params = FilterParams::from_pairs([
///     ("gender", "m"),
///     ("color[]", "red"),
///     ("color[]", "black"),
/// ]);
/// assert_eq!(params.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterParams {
    entries: BTreeMap<String, FilterValue>,
}

impl FilterParams {
    /// Creates an empty parameter set (unrestricted listing).
    pub fn new() -> Self {
        FilterParams::default()
    }

    /// Builder-style insert; replaces any previous value for `key`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts a value, replacing any previous value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Returns the raw value for `key`.
    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.entries.get(key)
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds parameters from decoded query-string pairs.
    ///
    /// ## Rules
    /// - A repeated key collects its values into a list
    /// - A `[]` suffix (`color[]=red`) always produces a list
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = FilterParams::new();

        for (key, value) in pairs {
            let key = key.as_ref();
            let (name, is_list) = match key.strip_suffix("[]") {
                Some(name) => (name, true),
                None => (key, false),
            };

            match params.entries.get_mut(name) {
                Some(existing) => existing.push(value.into()),
                None => {
                    let value = if is_list {
                        FilterValue::List(vec![value.into()])
                    } else {
                        FilterValue::Single(value.into())
                    };
                    params.entries.insert(name.to_string(), value);
                }
            }
        }

        params
    }

    /// Builds parameters from a JSON object.
    ///
    /// Values may be strings, numbers, booleans, or arrays of those; numbers
    /// and booleans are kept in their textual form so the registry parses
    /// them like query-string input. `null` values are treated as absent.
    ///
    /// ## Example
    /// ```rust
    /// use drops_core::filter::{FilterParams, FilterValue};
    /// use serde_json::json;
    ///
    /// let params = FilterParams::from_json(&json!({
    ///     "upcoming": 0,
    ///     "brandId": ["nike", "adidas"],
    /// })).unwrap();
    ///
    /// assert_eq!(params.get("upcoming"), Some(&FilterValue::Single("0".into())));
    /// ```
    pub fn from_json(value: &Value) -> ValidationResult<Self> {
        let object = value.as_object().ok_or_else(|| {
            ValidationError::invalid_format("filters", "expected a JSON object")
        })?;

        let mut params = FilterParams::new();

        for (key, value) in object {
            let value = match value {
                Value::Null => continue,
                Value::Array(items) => FilterValue::List(
                    items
                        .iter()
                        .map(|item| scalar_to_string(key, item))
                        .collect::<ValidationResult<Vec<_>>>()?,
                ),
                other => FilterValue::Single(scalar_to_string(key, other)?),
            };
            params.entries.insert(key.clone(), value);
        }

        Ok(params)
    }
}

impl TryFrom<Value> for FilterParams {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        FilterParams::from_json(&value)
    }
}

fn scalar_to_string(field: &str, value: &Value) -> ValidationResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(ValidationError::invalid_format(
            field,
            "expected a string, number or boolean",
        )),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_pairs_collects_repeated_keys() {
        let params = FilterParams::from_pairs([
            ("gender", "m"),
            ("gender", "f"),
            ("query", "air max"),
        ]);

        assert_eq!(
            params.get("gender"),
            Some(&FilterValue::List(vec!["m".into(), "f".into()]))
        );
        assert_eq!(
            params.get("query"),
            Some(&FilterValue::Single("air max".into()))
        );
    }

    #[test]
    fn test_from_pairs_bracket_suffix_is_list() {
        let params = FilterParams::from_pairs([("brandId[]", "nike")]);
        assert_eq!(
            params.get("brandId"),
            Some(&FilterValue::List(vec!["nike".into()]))
        );
        assert!(params.get("brandId[]").is_none());
    }

    #[test]
    fn test_from_json_stringifies_scalars() {
        let params = FilterParams::from_json(&json!({
            "upcoming": 0,
            "minPriceUSD": 99.5,
            "coming": true,
            "status": ["live", "closed"],
            "ignored": null,
        }))
        .unwrap();

        assert_eq!(params.get("upcoming"), Some(&FilterValue::from("0")));
        assert_eq!(params.get("minPriceUSD"), Some(&FilterValue::from("99.5")));
        assert_eq!(params.get("coming"), Some(&FilterValue::from("true")));
        assert_eq!(
            params.get("status"),
            Some(&FilterValue::from(vec!["live", "closed"]))
        );
        assert!(params.get("ignored").is_none());
    }

    #[test]
    fn test_from_json_rejects_nested_values() {
        assert!(FilterParams::from_json(&json!({ "gender": { "in": ["m"] } })).is_err());
        assert!(FilterParams::from_json(&json!({ "gender": [["m"]] })).is_err());
        assert!(FilterParams::from_json(&json!(["gender"])).is_err());
    }

    #[test]
    fn test_single_and_non_empty() {
        let single = FilterValue::from("2024-01-01");
        assert_eq!(single.single("fromDate").unwrap(), "2024-01-01");

        let one_item = FilterValue::from(vec!["2024-01-01"]);
        assert_eq!(one_item.single("fromDate").unwrap(), "2024-01-01");

        let many = FilterValue::from(vec!["a", "b"]);
        assert_eq!(
            many.single("fromDate"),
            Err(ValidationError::ExpectedSingleValue {
                field: "fromDate".into()
            })
        );

        let empty = FilterValue::List(Vec::new());
        assert!(matches!(
            empty.non_empty("status"),
            Err(ValidationError::EmptyList { .. })
        ));
    }
}
