//! # Catalog Repository
//!
//! Plain inserts for the entities the release listing reads: categories,
//! styles, releases and offers. Releases are normally created by an
//! upstream process; these writes exist for seeding and tests.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use drops_core::{Category, Offer, Release, Style};

/// Repository for catalog writes.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    pub async fn insert_category(&self, category: &Category) -> DbResult<()> {
        debug!(id = %category.id, name = %category.name, "Inserting category");

        sqlx::query("INSERT INTO categories (id, name) VALUES (?1, ?2)")
            .bind(&category.id)
            .bind(&category.name)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn insert_style(&self, style: &Style) -> DbResult<()> {
        debug!(id = %style.id, brand = %style.brand, "Inserting style");

        sqlx::query("INSERT INTO styles (id, brand, category_id) VALUES (?1, ?2, ?3)")
            .bind(&style.id)
            .bind(&style.brand)
            .bind(&style.category_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Inserts a release.
    ///
    /// ## Errors
    /// - `ForeignKeyViolation` when `style_id` names an unknown style
    pub async fn insert_release(&self, release: &Release) -> DbResult<()> {
        debug!(id = %release.id, slug = %release.slug, "Inserting release");

        sqlx::query(
            r#"
            INSERT INTO releases (
                id, slug, name, sku, gender, color, release_date,
                price_eur, price_gbp, price_usd, hidden_dashboard, style_id,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&release.id)
        .bind(&release.slug)
        .bind(&release.name)
        .bind(&release.sku)
        .bind(&release.gender)
        .bind(&release.color)
        .bind(release.release_date)
        .bind(release.price_eur)
        .bind(release.price_gbp)
        .bind(release.price_usd)
        .bind(release.hidden_dashboard)
        .bind(&release.style_id)
        .bind(release.created_at)
        .bind(release.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn insert_offer(&self, offer: &Offer) -> DbResult<()> {
        debug!(id = %offer.id, release_id = %offer.release_id, "Inserting offer");

        sqlx::query(
            "INSERT INTO offers (id, release_id, status, raffle, shipping) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&offer.id)
        .bind(&offer.release_id)
        .bind(&offer.status)
        .bind(offer.raffle)
        .bind(&offer.shipping)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Total number of releases, hidden ones included.
    pub async fn count_releases(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM releases")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use drops_core::{Category, Offer, Release, Style};

    fn release(id: &str, style_id: Option<&str>) -> Release {
        let now = Utc::now();
        Release {
            id: id.to_string(),
            slug: format!("{id}-slug"),
            name: id.to_string(),
            sku: id.to_uppercase(),
            gender: "u".to_string(),
            color: String::new(),
            release_date: None,
            price_eur: None,
            price_gbp: None,
            price_usd: None,
            hidden_dashboard: false,
            style_id: style_id.map(str::to_string),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_count() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let catalog = db.catalog();

        catalog
            .insert_category(&Category {
                id: "c1".to_string(),
                name: "Sneakers".to_string(),
            })
            .await
            .unwrap();
        catalog
            .insert_style(&Style {
                id: "s1".to_string(),
                brand: "nike".to_string(),
                category_id: Some("c1".to_string()),
            })
            .await
            .unwrap();
        catalog.insert_release(&release("r1", Some("s1"))).await.unwrap();
        catalog
            .insert_offer(&Offer {
                id: "o1".to_string(),
                release_id: "r1".to_string(),
                status: "live".to_string(),
                raffle: false,
                shipping: "eu".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(catalog.count_releases().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_style_is_fk_violation() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db
            .catalog()
            .insert_release(&release("r1", Some("missing")))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
