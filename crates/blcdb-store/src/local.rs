//! Filesystem-backed [`RecordStore`] for offline/demo mode.
//!
//! One JSON blob per key, written whole on every logical save — there is no
//! transactional layer underneath, so partial patches are never persisted.
//! The approved-subset mirror is rewritten on every submissions save and is
//! what the public listing consumes when the remote store is unavailable.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};

use blcdb_core::{
    AuthSession, BrandSubmission, IssueReport, NewReport, NewSubmission, ReportStatus,
    SubmissionStatus,
};

use crate::{RecordStore, StoreError};

/// Stable blob-key contract, kept compatible with the original client-side
/// storage layout.
pub const KEY_SUBMISSIONS: &str = "boycott_submissions";
pub const KEY_REPORTS: &str = "boycott_reports";
pub const KEY_APPROVED: &str = "boycott_approved";
pub const KEY_SESSION: &str = "boycott_user";

pub struct LocalStore {
    dir: PathBuf,
    // Synthesized ids are millisecond timestamps with a monotonic guard so
    // two inserts in the same millisecond never collide.
    last_id: Mutex<i64>,
}

impl LocalStore {
    /// Open (creating if needed) a blob directory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir).map_err(|source| StoreError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
            last_id: Mutex::new(0),
        })
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn read_blob<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let path = self.blob_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let value = serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
            key: key.to_owned(),
            source,
        })?;
        Ok(Some(value))
    }

    fn read_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StoreError> {
        Ok(self.read_blob(key)?.unwrap_or_default())
    }

    fn write_blob<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let path = self.blob_path(key);
        let raw = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Corrupt {
            key: key.to_owned(),
            source,
        })?;
        fs::write(&path, raw).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Persist the full submissions list and rewrite the approved mirror in
    /// the same logical save.
    fn save_submissions(&self, list: &[BrandSubmission]) -> Result<(), StoreError> {
        self.write_blob(KEY_SUBMISSIONS, &list)?;
        let approved: Vec<&BrandSubmission> = list
            .iter()
            .filter(|s| s.status == SubmissionStatus::Approved)
            .collect();
        self.write_blob(KEY_APPROVED, &approved)
    }

    fn next_id(&self) -> String {
        let mut last = self.last_id.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let now = Utc::now().timestamp_millis();
        *last = now.max(*last + 1);
        last.to_string()
    }

    /// Persist the demo-mode session record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the blob cannot be written.
    pub fn save_session(&self, session: &AuthSession) -> Result<(), StoreError> {
        self.write_blob(KEY_SESSION, session)
    }

    /// Load the demo-mode session record, if one was saved.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the blob exists but cannot be read.
    pub fn load_session(&self) -> Result<Option<AuthSession>, StoreError> {
        self.read_blob(KEY_SESSION)
    }

    /// Remove the demo-mode session record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the blob exists and cannot be removed.
    pub fn clear_session(&self) -> Result<(), StoreError> {
        let path = self.blob_path(KEY_SESSION);
        if path.exists() {
            fs::remove_file(&path).map_err(|source| StoreError::Io {
                path: path.display().to_string(),
                source,
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for LocalStore {
    async fn health(&self) -> Result<(), StoreError> {
        fs::metadata(&self.dir)
            .map(|_| ())
            .map_err(|source| StoreError::Io {
                path: self.dir.display().to_string(),
                source,
            })
    }

    async fn list_submissions(
        &self,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<BrandSubmission>, StoreError> {
        // The approved view is served from its mirror blob, which every
        // submissions save rewrites. Blobs from before the mirror existed
        // fall through to deriving the subset.
        if status == Some(SubmissionStatus::Approved) {
            if let Some(mut list) = self.read_blob::<Vec<BrandSubmission>>(KEY_APPROVED)? {
                list.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
                return Ok(list);
            }
        }
        let mut list: Vec<BrandSubmission> = self.read_list(KEY_SUBMISSIONS)?;
        if let Some(status) = status {
            list.retain(|s| s.status == status);
        }
        list.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(list)
    }

    async fn get_submission(&self, id: &str) -> Result<Option<BrandSubmission>, StoreError> {
        let list: Vec<BrandSubmission> = self.read_list(KEY_SUBMISSIONS)?;
        Ok(list.into_iter().find(|s| s.id == id))
    }

    async fn insert_submission(&self, new: &NewSubmission) -> Result<BrandSubmission, StoreError> {
        let record = BrandSubmission {
            id: self.next_id(),
            name: new.name.clone(),
            category: new.category,
            purpose: new.purpose.clone(),
            purpose_km: new.purpose_km.clone(),
            location: new.location.clone(),
            location_km: new.location_km.clone(),
            website: new.website.clone(),
            description: new.description.clone(),
            description_km: new.description_km.clone(),
            image_url: new.image_url.clone(),
            evidence_url: new.evidence_url.clone(),
            status: new.status,
            submitted_by: new.submitted_by.clone(),
            submitted_at: Utc::now(),
        };
        let mut list: Vec<BrandSubmission> = self.read_list(KEY_SUBMISSIONS)?;
        list.insert(0, record.clone());
        self.save_submissions(&list)?;
        Ok(record)
    }

    async fn update_submission(&self, record: &BrandSubmission) -> Result<(), StoreError> {
        let mut list: Vec<BrandSubmission> = self.read_list(KEY_SUBMISSIONS)?;
        let slot = list
            .iter_mut()
            .find(|s| s.id == record.id)
            .ok_or_else(|| StoreError::NotFound(record.id.clone()))?;
        *slot = record.clone();
        self.save_submissions(&list)
    }

    async fn update_submission_status(
        &self,
        id: &str,
        status: SubmissionStatus,
    ) -> Result<(), StoreError> {
        let mut list: Vec<BrandSubmission> = self.read_list(KEY_SUBMISSIONS)?;
        let slot = list
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))?;
        slot.status = status;
        self.save_submissions(&list)
    }

    async fn delete_submission(&self, id: &str) -> Result<(), StoreError> {
        let mut list: Vec<BrandSubmission> = self.read_list(KEY_SUBMISSIONS)?;
        list.retain(|s| s.id != id);
        self.save_submissions(&list)
    }

    async fn list_reports(
        &self,
        status: Option<ReportStatus>,
    ) -> Result<Vec<IssueReport>, StoreError> {
        let mut list: Vec<IssueReport> = self.read_list(KEY_REPORTS)?;
        if let Some(status) = status {
            list.retain(|r| r.status == status);
        }
        list.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(list)
    }

    async fn get_report(&self, id: &str) -> Result<Option<IssueReport>, StoreError> {
        let list: Vec<IssueReport> = self.read_list(KEY_REPORTS)?;
        Ok(list.into_iter().find(|r| r.id == id))
    }

    async fn insert_report(&self, new: &NewReport) -> Result<IssueReport, StoreError> {
        let record = IssueReport {
            id: self.next_id(),
            brand_id: new.brand_id.clone(),
            brand_name: new.brand_name.clone(),
            brand_image: new.brand_image.clone(),
            reason: new.reason,
            details: new.details.clone(),
            email: new.email.clone(),
            status: new.status,
            submitted_at: Utc::now(),
        };
        let mut list: Vec<IssueReport> = self.read_list(KEY_REPORTS)?;
        list.insert(0, record.clone());
        self.write_blob(KEY_REPORTS, &list)?;
        Ok(record)
    }

    async fn update_report_status(
        &self,
        id: &str,
        status: ReportStatus,
    ) -> Result<(), StoreError> {
        let mut list: Vec<IssueReport> = self.read_list(KEY_REPORTS)?;
        let slot = list
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))?;
        slot.status = status;
        self.write_blob(KEY_REPORTS, &list)
    }

    async fn delete_report(&self, id: &str) -> Result<(), StoreError> {
        let mut list: Vec<IssueReport> = self.read_list(KEY_REPORTS)?;
        list.retain(|r| r.id != id);
        self.write_blob(KEY_REPORTS, &list)
    }
}
