//! # Error Types
//!
//! Domain-specific error types for drops-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  drops-core errors (this file)                                         │
//! │  └── ValidationError  - Malformed filter input                         │
//! │                                                                         │
//! │  drops-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Flow: ValidationError → DbError::Validation → caller                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `ValidationError` raised while composing a query aborts the composition:
//! no SQL is executed for a request carrying a malformed number or date.

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by the filter registry when a raw value cannot be turned into a
/// predicate.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required value is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value could not be parsed as a number.
    #[error("{field} must be a number, got '{value}'")]
    InvalidNumber { field: String, value: String },

    /// Value could not be parsed as a date.
    #[error("{field} must be a date (YYYY-MM-DD or RFC 3339), got '{value}'")]
    InvalidDate { field: String, value: String },

    /// Invalid format (e.g., invalid UUID, nested JSON).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A scalar filter received several values.
    #[error("{field} accepts a single value")]
    ExpectedSingleValue { field: String },

    /// A list filter received an empty list.
    #[error("{field} must not be an empty list")]
    EmptyList { field: String },
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub(crate) fn invalid_format(field: &str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::InvalidNumber {
            field: "minPriceUSD".to_string(),
            value: "cheap".to_string(),
        };
        assert_eq!(err.to_string(), "minPriceUSD must be a number, got 'cheap'");

        let err = ValidationError::required("query");
        assert_eq!(err.to_string(), "query is required");

        let err = ValidationError::ExpectedSingleValue {
            field: "fromDate".to_string(),
        };
        assert_eq!(err.to_string(), "fromDate accepts a single value");
    }
}
