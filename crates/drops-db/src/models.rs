//! Row types for result sets that do not map one-to-one onto a domain type.

use chrono::{DateTime, NaiveDate, Utc};
use drops_core::{Category, Release, ReleaseImage, StyleSummary};

/// Column list selected for a release, qualified with the `r` alias.
pub(crate) const RELEASE_COLUMNS: &str = "r.id, r.slug, r.name, r.sku, r.gender, r.color, \
     r.release_date, r.price_eur, r.price_gbp, r.price_usd, r.hidden_dashboard, r.style_id, \
     r.created_at, r.updated_at";

/// A `releases` row.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ReleaseRow {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub sku: String,
    pub gender: String,
    pub color: String,
    pub release_date: Option<NaiveDate>,
    pub price_eur: Option<f64>,
    pub price_gbp: Option<f64>,
    pub price_usd: Option<f64>,
    pub hidden_dashboard: bool,
    pub style_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ReleaseRow> for Release {
    fn from(row: ReleaseRow) -> Self {
        Release {
            id: row.id,
            slug: row.slug,
            name: row.name,
            sku: row.sku,
            gender: row.gender,
            color: row.color,
            release_date: row.release_date,
            price_eur: row.price_eur,
            price_gbp: row.price_gbp,
            price_usd: row.price_usd,
            hidden_dashboard: row.hidden_dashboard,
            style_id: row.style_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// An image joined with the release that owns it through the link table.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ReleaseImageRow {
    pub id: String,
    pub release_id: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
}

impl From<ReleaseImageRow> for ReleaseImage {
    fn from(row: ReleaseImageRow) -> Self {
        ReleaseImage {
            id: row.id,
            release_id: row.release_id,
            image: row.image,
            created_at: row.created_at,
        }
    }
}

/// A style left-joined with its category.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct StyleRow {
    pub id: String,
    pub brand: String,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
}

impl StyleRow {
    /// Projects the row; a style without a category has none attached.
    pub fn into_summary(self) -> StyleSummary {
        let category = match (self.category_id, self.category_name) {
            (Some(id), Some(name)) => Some(Category { id, name }),
            _ => None,
        };
        StyleSummary {
            id: self.id,
            brand: self.brand,
            category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_row_category_projection() {
        let row = StyleRow {
            id: "s1".to_string(),
            brand: "nike".to_string(),
            category_id: Some("c1".to_string()),
            category_name: Some("Sneakers".to_string()),
        };
        let summary = row.into_summary();
        assert_eq!(summary.category.unwrap().name, "Sneakers");

        let row = StyleRow {
            id: "s2".to_string(),
            brand: "stussy".to_string(),
            category_id: None,
            category_name: None,
        };
        let summary = row.into_summary();
        assert_eq!(summary.brand, "stussy");
        assert!(summary.category.is_none());
    }
}
