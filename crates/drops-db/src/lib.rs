//! # drops-db: Database Layer for the Drop Catalog
//!
//! SQLite persistence for releases and everything a release listing joins:
//! styles, categories, offers and images. Uses sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Drop Catalog Data Flow                           │
//! │                                                                         │
//! │  Caller: db.releases().list(&FilterParams)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  drops-core   compose() → ReleaseQuery   (pure, no I/O)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                ▼                                        │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     drops-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐  ┌───────────────┐  ┌──────────────────┐   │   │
//! │  │   │   Database    │  │      sql      │  │   Repositories   │   │   │
//! │  │   │   (pool.rs)   │  │ ReleaseQuery  │  │ ReleaseRepo      │   │   │
//! │  │   │ SqlitePool    │◄─│   → SQL text  │◄─│ CatalogRepo      │   │   │
//! │  │   │ + migrations  │  │   + binds     │  │ UserRepo         │   │   │
//! │  │   └───────────────┘  └───────────────┘  └──────────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`sql`] - Rendering of composed queries into SQLite statements
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (release, catalog, user)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use drops_core::FilterParams;
//! use drops_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//!
//! let params = FilterParams::from_pairs([("gender", "m"), ("coming", "1")]);
//! let releases = db.releases().list(&params).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
mod models;
pub mod pool;
pub mod repository;
pub mod sql;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ConfigError, DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::catalog::CatalogRepository;
pub use repository::release::{ReleasePage, ReleaseRepository};
pub use repository::user::UserRepository;
