//! # Release Repository
//!
//! Filtered release listing with eager-loaded associations, plus the
//! targeted mutations the catalog needs (image association, dashboard flag,
//! timestamp patch).
//!
//! ## Listing Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    list(?gender=m&status=live)                          │
//! │                                                                         │
//! │  FilterParams                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  compose(params, today)  ── ValidationError ──► DbError::Validation    │
//! │       │                     (no SQL executed)                          │
//! │       ▼                                                                 │
//! │  ReleaseQuery ─► sql::push_release_select ─► SELECT DISTINCT r.* ...   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Vec<Release>                                                          │
//! │       │                                                                 │
//! │       ├── images  ← release_image_links ⋈ release_images  (IN ids)     │
//! │       ├── style   ← styles ⟕ categories                   (IN ids)     │
//! │       └── offers  ← offers                                 (IN ids)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Vec<ReleaseDetails>   (one per release, never duplicated by offers)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Associations are loaded with one query per association kind, keyed by the
//! ids of the listed releases, instead of being joined into the main
//! statement. Offers are therefore returned in full even when a `status` or
//! `shipping` filter selected the release through one of them.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::{ReleaseImageRow, ReleaseRow, StyleRow};
use crate::sql::{push_release_count, push_release_select};
use drops_core::filter::{FilterContext, FilterParams};
use drops_core::query::{compose, Include, ReleaseQuery};
use drops_core::{NewReleaseImage, Offer, OfferSummary, Release, ReleaseDetails, ReleaseImage};

/// Maximum number of ids bound into one `IN (...)` list.
const IN_CHUNK: usize = 500;

/// One page of a filtered listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleasePage {
    pub releases: Vec<ReleaseDetails>,
    /// Matching releases across all pages.
    pub total: i64,
    pub limit: u32,
    pub offset: u32,
}

/// Repository for release reads and targeted mutations.
///
/// ## Usage
/// ```rust,ignore
/// let params = FilterParams::from_pairs([("brandId", "nike"), ("coming", "1")]);
/// let releases = db.releases().list(&params).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ReleaseRepository {
    pool: SqlitePool,
}

impl ReleaseRepository {
    /// Creates a new ReleaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReleaseRepository { pool }
    }

    // =========================================================================
    // Listing
    // =========================================================================

    /// Lists releases matching `params`, evaluated against today's UTC date.
    ///
    /// ## Errors
    /// - `Validation` for malformed filter values, before any SQL runs
    pub async fn list(&self, params: &FilterParams) -> DbResult<Vec<ReleaseDetails>> {
        self.list_at(params, &FilterContext::now()).await
    }

    /// Same as [`list`](Self::list) with an explicit evaluation date.
    pub async fn list_at(
        &self,
        params: &FilterParams,
        ctx: &FilterContext,
    ) -> DbResult<Vec<ReleaseDetails>> {
        let query = compose(params, ctx)?;

        debug!(
            filters = query.clauses.len(),
            today = %ctx.today,
            "Listing releases"
        );

        self.fetch(&query).await
    }

    /// Lists one page of releases matching `params`, with the total count.
    pub async fn list_page(
        &self,
        params: &FilterParams,
        limit: u32,
        offset: u32,
    ) -> DbResult<ReleasePage> {
        self.list_page_at(params, &FilterContext::now(), limit, offset)
            .await
    }

    pub async fn list_page_at(
        &self,
        params: &FilterParams,
        ctx: &FilterContext,
        limit: u32,
        offset: u32,
    ) -> DbResult<ReleasePage> {
        let query = compose(params, ctx)?.with_page(limit, offset);

        debug!(filters = query.clauses.len(), limit, offset, "Listing release page");

        let total: i64 = push_release_count(&query)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;
        let releases = self.fetch(&query).await?;

        Ok(ReleasePage {
            releases,
            total,
            limit,
            offset,
        })
    }

    /// Runs a composed query and attaches its requested associations.
    pub async fn fetch(&self, query: &ReleaseQuery) -> DbResult<Vec<ReleaseDetails>> {
        let releases = self.fetch_releases(query).await?;
        debug!(count = releases.len(), "Query returned releases");

        self.attach_includes(releases, query).await
    }

    /// Gets a release by id with all associations.
    ///
    /// ## Returns
    /// * `Ok(Some(details))` - Release found
    /// * `Ok(None)` - Release not found
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<ReleaseDetails>> {
        debug!(id = %id, "Getting release by ID");

        let mut found = self.fetch(&ReleaseQuery::by_id(id)).await?;
        Ok(found.pop())
    }

    /// Releases dated strictly before `cutoff`, oldest first, without
    /// associations. Unscheduled releases never qualify.
    pub async fn get_past_releases(&self, cutoff: NaiveDate) -> DbResult<Vec<Release>> {
        debug!(cutoff = %cutoff, "Getting past releases");

        self.fetch_releases(&ReleaseQuery::released_before(cutoff))
            .await
    }

    /// Number of releases whose slug starts with `prefix` (case-sensitive).
    pub async fn count_like_releases(&self, prefix: &str) -> DbResult<i64> {
        debug!(prefix = %prefix, "Counting releases by slug prefix");

        let count: i64 = push_release_count(&ReleaseQuery::slug_prefix(prefix))
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Images
    // =========================================================================

    /// Attaches new images to a release.
    ///
    /// Image rows and link rows are written in one transaction: either all
    /// of them exist afterwards or none do.
    ///
    /// ## Errors
    /// - `NotFound` if the release doesn't exist (nothing is inserted)
    pub async fn create_images(
        &self,
        release_id: &str,
        images: &[NewReleaseImage],
    ) -> DbResult<Vec<ReleaseImage>> {
        debug!(release_id = %release_id, count = images.len(), "Creating release images");

        let mut tx = self.pool.begin().await?;

        if !release_exists(&mut *tx, release_id).await? {
            return Err(DbError::not_found("Release", release_id));
        }

        let created_at = Utc::now();
        let mut created = Vec::with_capacity(images.len());

        for new_image in images {
            let image = ReleaseImage {
                id: Uuid::new_v4().to_string(),
                release_id: release_id.to_string(),
                image: new_image.image.clone(),
                created_at,
            };

            sqlx::query("INSERT INTO release_images (id, image, created_at) VALUES (?1, ?2, ?3)")
                .bind(&image.id)
                .bind(&image.image)
                .bind(image.created_at)
                .execute(&mut *tx)
                .await?;

            sqlx::query("INSERT INTO release_image_links (release_id, image_id) VALUES (?1, ?2)")
                .bind(release_id)
                .bind(&image.id)
                .execute(&mut *tx)
                .await?;

            created.push(image);
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(release_id = %release_id, count = created.len(), "Release images created");
        Ok(created)
    }

    /// All images of a release in creation order.
    ///
    /// ## Errors
    /// - `NotFound` if the release doesn't exist; an existing release
    ///   without images yields an empty list
    pub async fn get_all_images(&self, release_id: &str) -> DbResult<Vec<ReleaseImage>> {
        debug!(release_id = %release_id, "Getting release images");

        if !release_exists(&self.pool, release_id).await? {
            return Err(DbError::not_found("Release", release_id));
        }

        let ids = [release_id.to_string()];
        let images = self
            .fetch_by_ids::<ReleaseImageRow>(IMAGES_BY_RELEASE, IMAGES_ORDER, &ids)
            .await?;

        Ok(images.into_iter().map(ReleaseImage::from).collect())
    }

    /// Deletes an image and its link rows. Unknown ids are a no-op.
    pub async fn destroy_image(&self, image_id: &str) -> DbResult<()> {
        debug!(image_id = %image_id, "Destroying release image");

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM release_image_links WHERE image_id = ?1")
            .bind(image_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM release_images WHERE id = ?1")
            .bind(image_id)
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(deleted = result.rows_affected(), "Release image destroyed");
        Ok(())
    }

    // =========================================================================
    // Flags & timestamps
    // =========================================================================

    /// Sets the dashboard visibility flag. Unknown ids are a no-op.
    pub async fn set_hidden_dashboard(&self, release_id: &str, hidden: bool) -> DbResult<()> {
        debug!(release_id = %release_id, hidden, "Setting hidden_dashboard");

        sqlx::query("UPDATE releases SET hidden_dashboard = ?1 WHERE id = ?2")
            .bind(hidden)
            .bind(release_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Writes `updated_at` verbatim; no other column changes.
    pub async fn modify_updated_at(
        &self,
        release_id: &str,
        updated_at: DateTime<Utc>,
    ) -> DbResult<()> {
        debug!(release_id = %release_id, updated_at = %updated_at, "Patching updated_at");

        sqlx::query("UPDATE releases SET updated_at = ?1 WHERE id = ?2")
            .bind(updated_at)
            .bind(release_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn fetch_releases(&self, query: &ReleaseQuery) -> DbResult<Vec<Release>> {
        let rows: Vec<ReleaseRow> = push_release_select(query)
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Release::from).collect())
    }

    async fn attach_includes(
        &self,
        releases: Vec<Release>,
        query: &ReleaseQuery,
    ) -> DbResult<Vec<ReleaseDetails>> {
        if releases.is_empty() || query.includes.is_empty() {
            return Ok(releases.into_iter().map(ReleaseDetails::bare).collect());
        }

        let release_ids: Vec<String> = releases.iter().map(|r| r.id.clone()).collect();

        let mut images: HashMap<String, Vec<ReleaseImage>> = HashMap::new();
        if query.includes(Include::Images) {
            let rows = self
                .fetch_by_ids::<ReleaseImageRow>(IMAGES_BY_RELEASE, IMAGES_ORDER, &release_ids)
                .await?;
            for row in rows {
                images
                    .entry(row.release_id.clone())
                    .or_default()
                    .push(ReleaseImage::from(row));
            }
        }

        let mut styles: HashMap<String, StyleRow> = HashMap::new();
        if query.includes(Include::Style) {
            let mut style_ids: Vec<String> =
                releases.iter().filter_map(|r| r.style_id.clone()).collect();
            style_ids.sort();
            style_ids.dedup();

            let rows = self
                .fetch_by_ids::<StyleRow>(STYLES_BY_ID, "", &style_ids)
                .await?;
            styles.extend(rows.into_iter().map(|row| (row.id.clone(), row)));
        }

        let mut offers: HashMap<String, Vec<OfferSummary>> = HashMap::new();
        if query.includes(Include::Offers) {
            let rows = self
                .fetch_by_ids::<Offer>(OFFERS_BY_RELEASE, OFFERS_ORDER, &release_ids)
                .await?;
            for offer in rows {
                offers
                    .entry(offer.release_id.clone())
                    .or_default()
                    .push(OfferSummary::from(offer));
            }
        }

        let details = releases
            .into_iter()
            .map(|release| {
                let style = release
                    .style_id
                    .as_ref()
                    .and_then(|style_id| styles.get(style_id))
                    .map(|row| row.clone().into_summary());
                ReleaseDetails {
                    images: images.remove(&release.id).unwrap_or_default(),
                    offers: offers.remove(&release.id).unwrap_or_default(),
                    style,
                    release,
                }
            })
            .collect();

        Ok(details)
    }

    /// Runs `{prefix} (?, ?, ...){suffix}` over `ids` in chunks.
    ///
    /// Rows for one id always come from the same chunk, so a per-id ORDER
    /// BY in `suffix` holds across the whole result.
    async fn fetch_by_ids<T>(&self, prefix: &str, suffix: &str, ids: &[String]) -> DbResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let mut out = Vec::new();

        for chunk in ids.chunks(IN_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!("{prefix} ({placeholders}){suffix}");

            let mut query = sqlx::query_as::<_, T>(&sql);
            for id in chunk {
                query = query.bind(id.as_str());
            }
            out.extend(query.fetch_all(&self.pool).await?);
        }

        Ok(out)
    }
}

const IMAGES_BY_RELEASE: &str = "SELECT i.id, l.release_id, i.image, i.created_at \
     FROM release_image_links l \
     JOIN release_images i ON i.id = l.image_id \
     WHERE l.release_id IN";

const IMAGES_ORDER: &str = " ORDER BY i.created_at, i.rowid";

const STYLES_BY_ID: &str = "SELECT s.id, s.brand, s.category_id, c.name AS category_name \
     FROM styles s \
     LEFT JOIN categories c ON c.id = s.category_id \
     WHERE s.id IN";

const OFFERS_BY_RELEASE: &str =
    "SELECT id, release_id, status, raffle, shipping FROM offers WHERE release_id IN";

const OFFERS_ORDER: &str = " ORDER BY rowid";

async fn release_exists<'e, E>(executor: E, release_id: &str) -> DbResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM releases WHERE id = ?1")
        .bind(release_id)
        .fetch_optional(executor)
        .await?;

    Ok(found.is_some())
}

// =============================================================================
// Unit Tests
// =============================================================================
