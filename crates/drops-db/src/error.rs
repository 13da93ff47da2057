//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  Malformed filter (drops_core::ValidationError)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError::Validation ← raised before any SQL runs                      │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller's error layer (HTTP status, CLI message, ...)                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use drops_core::ValidationError;
use thiserror::Error;

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `create_images` / `get_all_images` on an unknown release id
    /// - `fetch_one` returns no rows
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Filter input could not be turned into a query.
    ///
    /// ## When This Occurs
    /// - Non-numeric price bound (`minPriceUSD=cheap`)
    /// - Unparsable date (`fromDate=soon`)
    /// - Empty search text
    #[error("Invalid filter: {0}")]
    Validation(#[from] ValidationError),

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Seeding a user whose email already exists
    /// - Any UNIQUE index violation
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Offer referencing a non-existent release
    /// - Release referencing a non-existent style
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Any other backend failure, kept as the original sqlx error.
    ///
    /// ## When This Occurs
    /// - Malformed SQL, type mismatch while decoding a row
    /// - I/O or protocol errors from the SQLite driver
    #[error("Database error: {0}")]
    Backend(#[source] sqlx::Error),

    /// Transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Whether this is a lookup miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → UNIQUE / FOREIGN KEY constraint variants
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Backend (original error kept)
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let msg = db_err.message();

            // SQLite constraint messages:
            // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
            // FK constraint: "FOREIGN KEY constraint failed"
            if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                return DbError::UniqueViolation {
                    field: field.to_string(),
                    value: "unknown".to_string(),
                };
            }
            if msg.contains("FOREIGN KEY constraint failed") {
                return DbError::ForeignKeyViolation {
                    message: msg.to_string(),
                };
            }
        }

        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            other => DbError::Backend(other),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Configuration Error
// =============================================================================

/// Errors loading [`DbConfig`](crate::DbConfig) from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DbError::not_found("Release", "abc");
        assert_eq!(err.to_string(), "Release not found: abc");
        assert!(err.is_not_found());

        let err = DbError::duplicate("users.email", "test@example.com");
        assert_eq!(
            err.to_string(),
            "Duplicate users.email: 'test@example.com' already exists"
        );
    }

    #[test]
    fn test_validation_converts() {
        let err: DbError = ValidationError::Required {
            field: "query".to_string(),
        }
        .into();
        assert!(matches!(err, DbError::Validation(_)));
        assert_eq!(err.to_string(), "Invalid filter: query is required");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(err.is_not_found());

        let err: DbError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, DbError::PoolExhausted));
    }

    #[test]
    fn test_other_errors_keep_source() {
        use std::error::Error as _;

        let err: DbError = sqlx::Error::Protocol("unexpected packet".to_string()).into();
        assert!(matches!(err, DbError::Backend(sqlx::Error::Protocol(_))));
        assert!(err.source().is_some());
    }

    #[tokio::test]
    async fn test_malformed_sql_is_backend_error() {
        use crate::pool::{Database, DbConfig};

        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err: DbError = sqlx::query("SELEC 1")
            .execute(db.pool())
            .await
            .unwrap_err()
            .into();

        assert!(matches!(err, DbError::Backend(sqlx::Error::Database(_))));
    }
}
