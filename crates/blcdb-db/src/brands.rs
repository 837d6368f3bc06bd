//! Database operations for the `brands` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use blcdb_core::{BrandSubmission, Category, NewSubmission, SubmissionStatus};

use crate::DbError;

const BRAND_COLUMNS: &str = "id, name, category, purpose, purpose_km, location, location_km, \
     website, description, description_km, image_url, evidence_url, status, submitted_by, \
     created_at";

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `brands` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BrandRow {
    pub id: String,
    pub name: String,
    pub category: String,
    pub purpose: String,
    pub purpose_km: Option<String>,
    pub location: String,
    pub location_km: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub description_km: Option<String>,
    pub image_url: Option<String>,
    pub evidence_url: Option<String>,
    pub status: String,
    pub submitted_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BrandRow {
    /// Convert the wire row (snake_case, nullable text) into the in-memory
    /// record. Unknown category labels and statuses from legacy rows map to
    /// safe defaults instead of failing the whole listing.
    #[must_use]
    pub fn into_domain(self) -> BrandSubmission {
        let status = SubmissionStatus::parse(&self.status).unwrap_or_else(|| {
            tracing::warn!(id = %self.id, status = %self.status, "unknown brand status in store");
            SubmissionStatus::Pending
        });
        BrandSubmission {
            id: self.id,
            name: self.name,
            category: Category::from_label_or_default(&self.category),
            purpose: self.purpose,
            purpose_km: self.purpose_km.unwrap_or_default(),
            location: self.location,
            location_km: self.location_km.unwrap_or_default(),
            website: self.website.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            description_km: self.description_km.unwrap_or_default(),
            image_url: self.image_url,
            evidence_url: self.evidence_url,
            status,
            submitted_by: self.submitted_by.unwrap_or_default(),
            submitted_at: self.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns brands newest-first, optionally restricted to one status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_brands(
    pool: &PgPool,
    status: Option<SubmissionStatus>,
) -> Result<Vec<BrandRow>, DbError> {
    let rows = match status {
        Some(status) => {
            sqlx::query_as::<_, BrandRow>(&format!(
                "SELECT {BRAND_COLUMNS} FROM brands WHERE status = $1 ORDER BY created_at DESC"
            ))
            .bind(status.as_str())
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, BrandRow>(&format!(
                "SELECT {BRAND_COLUMNS} FROM brands ORDER BY created_at DESC"
            ))
            .fetch_all(pool)
            .await?
        }
    };
    Ok(rows)
}

/// Returns a single brand by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_brand(pool: &PgPool, id: &str) -> Result<Option<BrandRow>, DbError> {
    let row = sqlx::query_as::<_, BrandRow>(&format!(
        "SELECT {BRAND_COLUMNS} FROM brands WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Creates a new brand row and returns the full inserted row. The store
/// assigns the id and creation timestamp.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn insert_brand(pool: &PgPool, new: &NewSubmission) -> Result<BrandRow, DbError> {
    let row = sqlx::query_as::<_, BrandRow>(&format!(
        "INSERT INTO brands \
           (name, category, purpose, purpose_km, location, location_km, website, \
            description, description_km, image_url, evidence_url, status, submitted_by) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
         RETURNING {BRAND_COLUMNS}"
    ))
    .bind(&new.name)
    .bind(new.category.label_en())
    .bind(&new.purpose)
    .bind(&new.purpose_km)
    .bind(&new.location)
    .bind(&new.location_km)
    .bind(&new.website)
    .bind(&new.description)
    .bind(&new.description_km)
    .bind(new.image_url.as_deref())
    .bind(new.evidence_url.as_deref())
    .bind(new.status.as_str())
    .bind(&new.submitted_by)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Writes every content field of an existing brand (full-record edit).
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has the record's id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn update_brand(pool: &PgPool, record: &BrandSubmission) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE brands \
         SET name = $2, category = $3, purpose = $4, purpose_km = $5, location = $6, \
             location_km = $7, website = $8, description = $9, description_km = $10, \
             image_url = $11, evidence_url = $12, status = $13, submitted_by = $14 \
         WHERE id = $1",
    )
    .bind(&record.id)
    .bind(&record.name)
    .bind(record.category.label_en())
    .bind(&record.purpose)
    .bind(&record.purpose_km)
    .bind(&record.location)
    .bind(&record.location_km)
    .bind(&record.website)
    .bind(&record.description)
    .bind(&record.description_km)
    .bind(record.image_url.as_deref())
    .bind(record.evidence_url.as_deref())
    .bind(record.status.as_str())
    .bind(&record.submitted_by)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Updates only the moderation status of a brand.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has that id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn update_brand_status(
    pool: &PgPool,
    id: &str,
    status: SubmissionStatus,
) -> Result<(), DbError> {
    let result = sqlx::query("UPDATE brands SET status = $1 WHERE id = $2")
        .bind(status.as_str())
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Hard-deletes a brand. Deleting an id that is already gone is a no-op:
/// the compound report action treats a missing target as already handled.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_brand(pool: &PgPool, id: &str) -> Result<(), DbError> {
    sqlx::query("DELETE FROM brands WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
