//! Database operations for the `reports` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use blcdb_core::{IssueReport, NewReport, ReportReason, ReportStatus};

use crate::DbError;

const REPORT_COLUMNS: &str =
    "id, brand_id, brand_name, brand_image, reason, details, email, status, submitted_at";

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `reports` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReportRow {
    pub id: String,
    pub brand_id: String,
    pub brand_name: String,
    pub brand_image: Option<String>,
    pub reason: String,
    pub details: String,
    pub email: Option<String>,
    pub status: String,
    pub submitted_at: DateTime<Utc>,
}

impl ReportRow {
    /// Convert the wire row into the in-memory record, tolerating legacy
    /// values the same way the brand mapping does.
    #[must_use]
    pub fn into_domain(self) -> IssueReport {
        let status = ReportStatus::parse(&self.status).unwrap_or_else(|| {
            tracing::warn!(id = %self.id, status = %self.status, "unknown report status in store");
            ReportStatus::Pending
        });
        let reason = ReportReason::parse(&self.reason).unwrap_or_else(|| {
            tracing::warn!(id = %self.id, reason = %self.reason, "unknown report reason in store");
            ReportReason::Other
        });
        IssueReport {
            id: self.id,
            brand_id: self.brand_id,
            brand_name: self.brand_name,
            brand_image: self.brand_image,
            reason,
            details: self.details,
            email: self.email,
            status,
            submitted_at: self.submitted_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns reports newest-first, optionally restricted to one status.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_reports(
    pool: &PgPool,
    status: Option<ReportStatus>,
) -> Result<Vec<ReportRow>, DbError> {
    let rows = match status {
        Some(status) => {
            sqlx::query_as::<_, ReportRow>(&format!(
                "SELECT {REPORT_COLUMNS} FROM reports WHERE status = $1 \
                 ORDER BY submitted_at DESC"
            ))
            .bind(status.as_str())
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, ReportRow>(&format!(
                "SELECT {REPORT_COLUMNS} FROM reports ORDER BY submitted_at DESC"
            ))
            .fetch_all(pool)
            .await?
        }
    };
    Ok(rows)
}

/// Returns a single report by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_report(pool: &PgPool, id: &str) -> Result<Option<ReportRow>, DbError> {
    let row = sqlx::query_as::<_, ReportRow>(&format!(
        "SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Creates a new report row and returns the full inserted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn insert_report(pool: &PgPool, new: &NewReport) -> Result<ReportRow, DbError> {
    let row = sqlx::query_as::<_, ReportRow>(&format!(
        "INSERT INTO reports (brand_id, brand_name, brand_image, reason, details, email, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {REPORT_COLUMNS}"
    ))
    .bind(&new.brand_id)
    .bind(&new.brand_name)
    .bind(new.brand_image.as_deref())
    .bind(new.reason.as_str())
    .bind(&new.details)
    .bind(new.email.as_deref())
    .bind(new.status.as_str())
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Updates only the moderation status of a report.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has that id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn update_report_status(
    pool: &PgPool,
    id: &str,
    status: ReportStatus,
) -> Result<(), DbError> {
    let result = sqlx::query("UPDATE reports SET status = $1 WHERE id = $2")
        .bind(status.as_str())
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Hard-deletes a report.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_report(pool: &PgPool, id: &str) -> Result<(), DbError> {
    sqlx::query("DELETE FROM reports WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
