//! # Repository Module
//!
//! Database repository implementations for the drop catalog.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Repositories                                    │
//! │                                                                         │
//! │  Caller                                                                │
//! │       │                                                                 │
//! │       │  db.releases().list(&params)                                   │
//! │       ▼                                                                 │
//! │  ReleaseRepository                                                     │
//! │  ├── list / list_page / find_by_id        (composed ReleaseQuery)      │
//! │  ├── create_images / get_all_images / destroy_image                   │
//! │  ├── get_past_releases / count_like_releases                          │
//! │  └── set_hidden_dashboard / modify_updated_at                         │
//! │                                                                         │
//! │  CatalogRepository   inserts for seeding and tests                     │
//! │  UserRepository      seeded accounts                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ReleaseRepository`](release::ReleaseRepository) - Filtered listing, images, flags
//! - [`CatalogRepository`](catalog::CatalogRepository) - Category, style, release, offer inserts
//! - [`UserRepository`](user::UserRepository) - Seeded user accounts

pub mod catalog;
pub mod release;
pub mod user;
