//! # Validation Module
//!
//! Parsing of raw filter values into typed operands.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Where Parsing Happens                              │
//! │                                                                         │
//! │  "?minPriceUSD=100&fromDate=2024-01-01&query=air max"                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  FilterParams (raw strings)                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  THIS MODULE: parse_number / parse_date / tokenize_query              │
//! │  ├── Ok  → typed operand for the predicate                             │
//! │  └── Err → ValidationError, composition aborts                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Database (never reached with malformed input)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use drops_core::validation::{parse_number, tokenize_query};
//!
//! assert_eq!(parse_number("minPriceUSD", "99.5").unwrap(), 99.5);
//! assert_eq!(tokenize_query("air  max").unwrap(), vec!["air", "max"]);
//! ```

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Parsers
// =============================================================================

/// Parses a float filter operand (prices).
///
/// Surrounding whitespace is ignored; NaN and infinities are rejected.
///
/// ## Example
/// ```rust
/// use drops_core::validation::parse_number;
///
/// assert!(parse_number("maxPriceEUR", "120").is_ok());
/// assert!(parse_number("maxPriceEUR", "").is_err());
/// assert!(parse_number("maxPriceEUR", "12O").is_err());
/// ```
pub fn parse_number(field: &str, raw: &str) -> ValidationResult<f64> {
    let invalid = || ValidationError::InvalidNumber {
        field: field.to_string(),
        value: raw.to_string(),
    };

    let value: f64 = raw.trim().parse().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }

    Ok(value)
}

/// Parses an integer filter operand.
pub fn parse_integer(field: &str, raw: &str) -> ValidationResult<i64> {
    raw.trim()
        .parse()
        .map_err(|_| ValidationError::InvalidNumber {
            field: field.to_string(),
            value: raw.to_string(),
        })
}

// =============================================================================
// Date Parsers
// =============================================================================

/// Parses a date filter operand.
///
/// Accepts a plain `YYYY-MM-DD` date or an RFC 3339 timestamp, which is
/// normalised to its UTC calendar date.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use drops_core::validation::parse_date;
///
/// let expected = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// assert_eq!(parse_date("fromDate", "2024-03-01").unwrap(), expected);
/// assert_eq!(parse_date("fromDate", "2024-03-01T23:30:00-02:00").unwrap(),
///            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
/// ```
pub fn parse_date(field: &str, raw: &str) -> ValidationResult<NaiveDate> {
    let trimmed = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| ValidationError::InvalidDate {
            field: field.to_string(),
            value: raw.to_string(),
        })
}

// =============================================================================
// Text Parsers
// =============================================================================

/// Splits a free-text search into whitespace-separated tokens.
///
/// ## Rules
/// - Runs of whitespace count as one separator, so no token is empty
/// - A query with no tokens at all is rejected
pub fn tokenize_query(raw: &str) -> ValidationResult<Vec<String>> {
    let tokens: Vec<String> = raw.split_whitespace().map(str::to_string).collect();

    if tokens.is_empty() {
        return Err(ValidationError::required("query"));
    }

    Ok(tokens)
}

/// Validates a non-empty text operand for equality/substring filters.
pub fn require_text<'a>(field: &str, raw: &'a str) -> ValidationResult<&'a str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(trimmed)
}

// =============================================================================
// Unit Tests
// =============================================================================
