//! Public-listing loader with graceful degradation.
//!
//! Only the public read path may fall back to the bundled seed catalog —
//! admin views must always see the truth of the store, so they call the
//! store directly and surface failures.

use serde::Serialize;

use blcdb_core::{BrandSubmission, SubmissionStatus};

use crate::RecordStore;

/// Where the listing data actually came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingSource {
    Remote,
    Fallback,
}

/// Fetch the approved listing, degrading to the seed catalog when the store
/// is unreachable. The result is flagged so the caller can render an
/// offline/fallback indicator.
pub async fn load_public_listing(
    store: &dyn RecordStore,
    seed: &[BrandSubmission],
) -> (Vec<BrandSubmission>, ListingSource) {
    match store.list_submissions(Some(SubmissionStatus::Approved)).await {
        Ok(records) => (records, ListingSource::Remote),
        Err(error) => {
            tracing::warn!(error = %error, "store unreachable, serving seed catalog");
            (seed.to_vec(), ListingSource::Fallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LocalStore, StoreError};
    use async_trait::async_trait;
    use blcdb_core::{Category, NewReport, NewSubmission, ReportStatus};

    /// A store whose every call fails, standing in for an unreachable remote.
    struct UnreachableStore;

    fn unreachable() -> StoreError {
        StoreError::Io {
            path: "remote".to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "down"),
        }
    }

    #[async_trait]
    impl RecordStore for UnreachableStore {
        async fn health(&self) -> Result<(), StoreError> {
            Err(unreachable())
        }
        async fn list_submissions(
            &self,
            _status: Option<SubmissionStatus>,
        ) -> Result<Vec<BrandSubmission>, StoreError> {
            Err(unreachable())
        }
        async fn get_submission(
            &self,
            _id: &str,
        ) -> Result<Option<BrandSubmission>, StoreError> {
            Err(unreachable())
        }
        async fn insert_submission(
            &self,
            _new: &NewSubmission,
        ) -> Result<BrandSubmission, StoreError> {
            Err(unreachable())
        }
        async fn update_submission(&self, _record: &BrandSubmission) -> Result<(), StoreError> {
            Err(unreachable())
        }
        async fn update_submission_status(
            &self,
            _id: &str,
            _status: SubmissionStatus,
        ) -> Result<(), StoreError> {
            Err(unreachable())
        }
        async fn delete_submission(&self, _id: &str) -> Result<(), StoreError> {
            Err(unreachable())
        }
        async fn list_reports(
            &self,
            _status: Option<ReportStatus>,
        ) -> Result<Vec<blcdb_core::IssueReport>, StoreError> {
            Err(unreachable())
        }
        async fn get_report(
            &self,
            _id: &str,
        ) -> Result<Option<blcdb_core::IssueReport>, StoreError> {
            Err(unreachable())
        }
        async fn insert_report(
            &self,
            _new: &NewReport,
        ) -> Result<blcdb_core::IssueReport, StoreError> {
            Err(unreachable())
        }
        async fn update_report_status(
            &self,
            _id: &str,
            _status: ReportStatus,
        ) -> Result<(), StoreError> {
            Err(unreachable())
        }
        async fn delete_report(&self, _id: &str) -> Result<(), StoreError> {
            Err(unreachable())
        }
    }

    fn seed_brand(name: &str) -> BrandSubmission {
        BrandSubmission {
            id: format!("seed-{name}"),
            name: name.to_owned(),
            category: Category::Retail,
            purpose: "Supermarket".to_owned(),
            purpose_km: String::new(),
            location: "Phnom Penh".to_owned(),
            location_km: String::new(),
            website: String::new(),
            description: String::new(),
            description_km: String::new(),
            image_url: None,
            evidence_url: None,
            status: SubmissionStatus::Approved,
            submitted_by: "seed".to_owned(),
            submitted_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn unreachable_store_degrades_to_seed_with_flag() {
        let seed = vec![seed_brand("Fallback Mart")];
        let (records, source) = load_public_listing(&UnreachableStore, &seed).await;
        assert_eq!(source, ListingSource::Fallback);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Fallback Mart");
    }

    #[tokio::test]
    async fn healthy_store_serves_remote_data() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = LocalStore::open(dir.path()).expect("open store");
        store
            .insert_submission(&NewSubmission {
                name: "Live Mart".to_owned(),
                category: Category::Retail,
                purpose: "Supermarket".to_owned(),
                purpose_km: String::new(),
                location: "Phnom Penh".to_owned(),
                location_km: String::new(),
                website: String::new(),
                description: String::new(),
                description_km: String::new(),
                image_url: None,
                evidence_url: None,
                status: SubmissionStatus::Approved,
                submitted_by: "tests".to_owned(),
            })
            .await
            .expect("insert");

        let seed = vec![seed_brand("Fallback Mart")];
        let (records, source) = load_public_listing(&store, &seed).await;
        assert_eq!(source, ListingSource::Remote);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Live Mart");
    }
}
