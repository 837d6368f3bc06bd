//! The record-store seam.
//!
//! Every view talks to persistence through [`RecordStore`], a capability
//! trait with two implementations selected once at startup: [`PgStore`]
//! (the production remote tabular store) and [`LocalStore`] (a keyed JSON
//! blob store for offline/demo mode). No call site branches between
//! backends after startup.

use async_trait::async_trait;
use thiserror::Error;

use blcdb_core::{
    BrandSubmission, IssueReport, NewReport, NewSubmission, ReportStatus, SubmissionStatus,
};

pub mod local;
pub mod pg;
pub mod public;
pub mod seed;

pub use local::LocalStore;
pub use pg::PgStore;
pub use public::{load_public_listing, ListingSource};
pub use seed::{load_seed_catalog, SeedError};

/// A remote store operation failed. Callers decide retry/rollback policy;
/// nothing in this crate silently swallows a write failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Db(#[from] blcdb_db::DbError),
    #[error("local store I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("local store data corrupted for key '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Uniform list/get/insert/update/delete contract over the two record
/// kinds. All operations are suspension points; callers must serialize
/// concurrent mutations of the same record.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Liveness probe for the health endpoint.
    async fn health(&self) -> Result<(), StoreError>;

    // Brand submissions
    async fn list_submissions(
        &self,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<BrandSubmission>, StoreError>;
    async fn get_submission(&self, id: &str) -> Result<Option<BrandSubmission>, StoreError>;
    async fn insert_submission(&self, new: &NewSubmission) -> Result<BrandSubmission, StoreError>;
    /// Full-record write of every content field (the admin edit action).
    async fn update_submission(&self, record: &BrandSubmission) -> Result<(), StoreError>;
    async fn update_submission_status(
        &self,
        id: &str,
        status: SubmissionStatus,
    ) -> Result<(), StoreError>;
    /// Hard delete. Deleting an id that is already gone succeeds.
    async fn delete_submission(&self, id: &str) -> Result<(), StoreError>;

    // Issue reports
    async fn list_reports(
        &self,
        status: Option<ReportStatus>,
    ) -> Result<Vec<IssueReport>, StoreError>;
    async fn get_report(&self, id: &str) -> Result<Option<IssueReport>, StoreError>;
    async fn insert_report(&self, new: &NewReport) -> Result<IssueReport, StoreError>;
    async fn update_report_status(&self, id: &str, status: ReportStatus)
        -> Result<(), StoreError>;
    async fn delete_report(&self, id: &str) -> Result<(), StoreError>;
}
