//! Postgres-backed [`RecordStore`] — the production remote tabular store.

use async_trait::async_trait;
use sqlx::PgPool;

use blcdb_core::{
    BrandSubmission, IssueReport, NewReport, NewSubmission, ReportStatus, SubmissionStatus,
};

use crate::{RecordStore, StoreError};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn health(&self) -> Result<(), StoreError> {
        blcdb_db::health_check(&self.pool).await.map_err(Into::into)
    }

    async fn list_submissions(
        &self,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<BrandSubmission>, StoreError> {
        let rows = blcdb_db::list_brands(&self.pool, status).await?;
        Ok(rows.into_iter().map(blcdb_db::BrandRow::into_domain).collect())
    }

    async fn get_submission(&self, id: &str) -> Result<Option<BrandSubmission>, StoreError> {
        let row = blcdb_db::get_brand(&self.pool, id).await?;
        Ok(row.map(blcdb_db::BrandRow::into_domain))
    }

    async fn insert_submission(&self, new: &NewSubmission) -> Result<BrandSubmission, StoreError> {
        let row = blcdb_db::insert_brand(&self.pool, new).await?;
        Ok(row.into_domain())
    }

    async fn update_submission(&self, record: &BrandSubmission) -> Result<(), StoreError> {
        blcdb_db::update_brand(&self.pool, record).await?;
        Ok(())
    }

    async fn update_submission_status(
        &self,
        id: &str,
        status: SubmissionStatus,
    ) -> Result<(), StoreError> {
        blcdb_db::update_brand_status(&self.pool, id, status).await?;
        Ok(())
    }

    async fn delete_submission(&self, id: &str) -> Result<(), StoreError> {
        blcdb_db::delete_brand(&self.pool, id).await?;
        Ok(())
    }

    async fn list_reports(
        &self,
        status: Option<ReportStatus>,
    ) -> Result<Vec<IssueReport>, StoreError> {
        let rows = blcdb_db::list_reports(&self.pool, status).await?;
        Ok(rows.into_iter().map(blcdb_db::ReportRow::into_domain).collect())
    }

    async fn get_report(&self, id: &str) -> Result<Option<IssueReport>, StoreError> {
        let row = blcdb_db::get_report(&self.pool, id).await?;
        Ok(row.map(blcdb_db::ReportRow::into_domain))
    }

    async fn insert_report(&self, new: &NewReport) -> Result<IssueReport, StoreError> {
        let row = blcdb_db::insert_report(&self.pool, new).await?;
        Ok(row.into_domain())
    }

    async fn update_report_status(
        &self,
        id: &str,
        status: ReportStatus,
    ) -> Result<(), StoreError> {
        blcdb_db::update_report_status(&self.pool, id, status).await?;
        Ok(())
    }

    async fn delete_report(&self, id: &str) -> Result<(), StoreError> {
        blcdb_db::delete_report(&self.pool, id).await?;
        Ok(())
    }
}
