//! # Domain Types
//!
//! Core domain types of the release catalog.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Category     │◄──│      Style      │◄──│     Release     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id, slug, sku  │       │
//! │  │  name           │   │  brand          │   │  release_date?  │       │
//! │  └─────────────────┘   │  category_id    │   │  price_*        │       │
//! │                        └─────────────────┘   └───────┬─────────┘       │
//! │                                                      │ 1..n            │
//! │                              ┌───────────────────────┼──────────┐      │
//! │                              ▼                                  ▼      │
//! │                     ┌─────────────────┐              ┌──────────────┐  │
//! │                     │  ReleaseImage   │              │    Offer     │  │
//! │                     │  image (URL)    │              │ status       │  │
//! │                     └─────────────────┘              │ raffle       │  │
//! │                                                      │ shipping     │  │
//! │                                                      └──────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Gender value that every `gender` filter also matches.
pub const UNISEX_GENDER: &str = "u";

// =============================================================================
// Category / Style
// =============================================================================

/// A product category (e.g. "Sneakers", "Apparel").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// A style groups releases under a brand and a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Style {
    pub id: String,
    pub brand: String,
    pub category_id: Option<String>,
}

// =============================================================================
// Release
// =============================================================================

/// A trackable product drop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Release {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// URL slug, e.g. `aj1-chicago-2022`.
    pub slug: String,

    /// Display name.
    pub name: String,

    /// Manufacturer style code.
    pub sku: String,

    /// `m`, `f`, `u` (unisex), ...
    pub gender: String,

    /// Free-text colorway.
    pub color: String,

    /// Scheduled date. `None` means upcoming/unscheduled.
    #[ts(as = "Option<String>")]
    pub release_date: Option<NaiveDate>,

    pub price_eur: Option<f64>,
    pub price_gbp: Option<f64>,
    pub price_usd: Option<f64>,

    /// Hidden from the admin dashboard.
    pub hidden_dashboard: bool,

    pub style_id: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Release {
    /// Whether the release has no scheduled date yet.
    #[inline]
    pub fn is_unscheduled(&self) -> bool {
        self.release_date.is_none()
    }
}

// =============================================================================
// Release Image
// =============================================================================

/// An image attached to a release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReleaseImage {
    pub id: String,
    pub release_id: String,
    /// Image URL or encoded payload.
    pub image: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Input for `create_images`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewReleaseImage {
    pub image: String,
}

impl NewReleaseImage {
    pub fn new(image: impl Into<String>) -> Self {
        NewReleaseImage {
            image: image.into(),
        }
    }
}

// =============================================================================
// Offer
// =============================================================================

/// A vendor purchase option for a release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Offer {
    pub id: String,
    pub release_id: String,
    /// Vendor-defined status, e.g. `live`, `closed`.
    pub status: String,
    pub raffle: bool,
    /// Shipping method, e.g. `worldwide`, `eu`, `pickup`.
    pub shipping: String,
}

// =============================================================================
// Eager-loaded projections
// =============================================================================

/// Offer attributes loaded alongside a release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OfferSummary {
    pub status: String,
    pub raffle: bool,
    pub shipping: String,
}

impl From<Offer> for OfferSummary {
    fn from(offer: Offer) -> Self {
        OfferSummary {
            status: offer.status,
            raffle: offer.raffle,
            shipping: offer.shipping,
        }
    }
}

/// Style attributes loaded alongside a release, with its category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StyleSummary {
    pub id: String,
    pub brand: String,
    pub category: Option<Category>,
}

/// A release together with its eager-loaded associations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReleaseDetails {
    pub release: Release,
    pub images: Vec<ReleaseImage>,
    pub style: Option<StyleSummary>,
    pub offers: Vec<OfferSummary>,
}

impl ReleaseDetails {
    /// Wraps a release with empty associations.
    pub fn bare(release: Release) -> Self {
        ReleaseDetails {
            release,
            images: Vec::new(),
            style: None,
            offers: Vec::new(),
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// An account. Only the seed path creates users at this layer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    #[ts(skip)]
    pub password_hash: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_release() -> Release {
        let now = Utc::now();
        Release {
            id: "r1".to_string(),
            slug: "aj1-red".to_string(),
            name: "Air Jordan 1 Red".to_string(),
            sku: "555088-600".to_string(),
            gender: "m".to_string(),
            color: "red/white".to_string(),
            release_date: None,
            price_eur: None,
            price_gbp: None,
            price_usd: Some(170.0),
            hidden_dashboard: false,
            style_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_unscheduled_release() {
        let mut release = sample_release();
        assert!(release.is_unscheduled());

        release.release_date = NaiveDate::from_ymd_opt(2024, 5, 1);
        assert!(!release.is_unscheduled());
    }

    #[test]
    fn test_offer_summary_drops_ids() {
        let offer = Offer {
            id: "o1".to_string(),
            release_id: "r1".to_string(),
            status: "live".to_string(),
            raffle: true,
            shipping: "eu".to_string(),
        };
        let summary = OfferSummary::from(offer);
        assert_eq!(summary.status, "live");
        assert!(summary.raffle);
        assert_eq!(summary.shipping, "eu");
    }

    #[test]
    fn test_user_password_hash_not_serialized() {
        let user = User {
            id: "u1".to_string(),
            email: "test@example.com".to_string(),
            username: "test".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("test@example.com"));
    }

    #[test]
    fn test_details_bare() {
        let details = ReleaseDetails::bare(sample_release());
        assert!(details.images.is_empty());
        assert!(details.offers.is_empty());
        assert!(details.style.is_none());
    }
}
