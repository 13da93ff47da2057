//! # drops-core: Pure Logic for the Drop Catalog
//!
//! This crate holds everything about the release catalog that does not need
//! a database: domain types, filter parsing, and query composition.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Drop Catalog Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Caller (HTTP handler, CLI, job, ...)               │   │
//! │  │      ?brandId=nike&gender=m&coming=1&query=air max             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ FilterParams                           │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ drops-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   filter   │  │   query   │  │ validation│  │   │
//! │  │   │  Release  │  │ FilterKey  │  │ compose() │  │  parsing  │  │   │
//! │  │   │  Offer... │  │ Predicate  │  │ReleaseQry │  │           │  │   │
//! │  │   └───────────┘  └────────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ ReleaseQuery                           │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    drops-db (Database Layer)                    │   │
//! │  │          SQL rendering, repositories, migrations, seed          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Release, ReleaseImage, Style, Offer, ...)
//! - [`filter`] - Filter parameters, predicates and the filter registry
//! - [`query`] - Composition of filters into a `ReleaseQuery`
//! - [`validation`] - Parsing of raw numbers, dates and search text
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use drops_core::filter::{FilterContext, FilterParams, TargetEntity};
//! use drops_core::query::compose;
//!
//! let params = FilterParams::from_pairs([("brandId", "nike"), ("coming", "1")]);
//! let ctx = FilterContext::at(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
//!
//! let query = compose(&params, &ctx).unwrap();
//! assert_eq!(query.clauses.len(), 2);
//! assert!(query.joins().contains(&TargetEntity::Style));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod filter;
pub mod query;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::ValidationError;
pub use filter::{FilterContext, FilterKey, FilterParams, FilterValue};
pub use query::{compose, Include, ReleaseQuery, SortOrder};
pub use types::*;
