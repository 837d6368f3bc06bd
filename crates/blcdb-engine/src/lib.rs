//! Moderation execution: applies workflow actions to cached records,
//! optimistically and with a defined rollback path.
//!
//! The engine owns a snapshot of the record set (one per view context) and
//! a [`RecordStore`] handle. Every mutation is reflected in the snapshot
//! synchronously, then persisted; if persistence fails, only the affected
//! record's cache entry is invalidated and refetched — the error is always
//! surfaced to the caller. Cache entries carry a generation stamp so a
//! refetch replaces exactly the entry it targets.
//!
//! Callers serialize operations against the same record (the server wraps
//! the engine in an async mutex); the engine itself never interleaves two
//! writes to one record.

use std::sync::Arc;

use thiserror::Error;

use blcdb_core::{
    filter_reports, filter_submissions, BrandSubmission, IllegalTransition, IssueReport,
    NewSubmission, ReportAction, ReportQuery, ReportStatus, SubmissionAction, SubmissionEdit,
    SubmissionQuery, SubmissionStatus,
};
use blcdb_store::{RecordStore, StoreError};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    IllegalTransition(#[from] IllegalTransition),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    record: T,
    generation: u64,
}

pub struct ModerationEngine {
    store: Arc<dyn RecordStore>,
    submissions: Vec<CacheEntry<BrandSubmission>>,
    reports: Vec<CacheEntry<IssueReport>>,
    generation: u64,
    loaded: bool,
}

impl ModerationEngine {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            submissions: Vec::new(),
            reports: Vec::new(),
            generation: 0,
            loaded: false,
        }
    }

    /// Replace the snapshot with a fresh fetch of both collections.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if either fetch fails; the previous snapshot
    /// is kept in that case.
    pub async fn reload(&mut self) -> Result<(), StoreError> {
        let submissions = self.store.list_submissions(None).await?;
        let reports = self.store.list_reports(None).await?;
        self.generation += 1;
        let generation = self.generation;
        self.submissions = submissions
            .into_iter()
            .map(|record| CacheEntry { record, generation })
            .collect();
        self.reports = reports
            .into_iter()
            .map(|record| CacheEntry { record, generation })
            .collect();
        self.loaded = true;
        Ok(())
    }

    /// Load the snapshot on first use.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the initial fetch fails.
    pub async fn ensure_loaded(&mut self) -> Result<(), StoreError> {
        if !self.loaded {
            self.reload().await?;
        }
        Ok(())
    }

    #[must_use]
    pub fn submissions(&self) -> Vec<BrandSubmission> {
        self.submissions.iter().map(|e| e.record.clone()).collect()
    }

    #[must_use]
    pub fn reports(&self) -> Vec<IssueReport> {
        self.reports.iter().map(|e| e.record.clone()).collect()
    }

    #[must_use]
    pub fn query_submissions(&self, query: &SubmissionQuery) -> Vec<BrandSubmission> {
        let records = self.submissions();
        filter_submissions(&records, query)
    }

    #[must_use]
    pub fn query_reports(&self, query: &ReportQuery) -> Vec<IssueReport> {
        let records = self.reports();
        filter_reports(&records, query)
    }

    #[must_use]
    pub fn submission(&self, id: &str) -> Option<&BrandSubmission> {
        self.submissions
            .iter()
            .find(|e| e.record.id == id)
            .map(|e| &e.record)
    }

    #[must_use]
    pub fn report(&self, id: &str) -> Option<&IssueReport> {
        self.reports
            .iter()
            .find(|e| e.record.id == id)
            .map(|e| &e.record)
    }

    // -----------------------------------------------------------------------
    // Brand submissions
    // -----------------------------------------------------------------------

    /// Apply a workflow action to one submission: legality check, optimistic
    /// cache update, then persist. A self-transition is a no-op that skips
    /// the store write.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotFound`] if the id is not in the snapshot,
    /// [`EngineError::IllegalTransition`] if the workflow forbids the edge
    /// (no state changes anywhere), or [`EngineError::Store`] if persistence
    /// failed (the optimistic change has been rolled back by refetch).
    pub async fn apply_submission_action(
        &mut self,
        id: &str,
        action: SubmissionAction,
    ) -> Result<SubmissionStatus, EngineError> {
        let entry = self
            .submissions
            .iter_mut()
            .find(|e| e.record.id == id)
            .ok_or_else(|| EngineError::NotFound(id.to_owned()))?;
        let current = entry.record.status;
        let next = current.apply(action)?;
        if next == current {
            return Ok(current);
        }

        entry.record.status = next;
        self.generation += 1;
        entry.generation = self.generation;

        let persisted = self.store.update_submission_status(id, next).await;
        if let Err(error) = persisted {
            tracing::warn!(id, %error, "submission status persist failed, refetching record");
            self.refetch_submission(id).await;
            return Err(error.into());
        }
        Ok(next)
    }

    /// Insert a new record (admin create or accepted intake) and add it to
    /// the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if the insert fails; nothing is added
    /// locally in that case.
    pub async fn create_submission(
        &mut self,
        new: &NewSubmission,
    ) -> Result<BrandSubmission, EngineError> {
        let record = self.store.insert_submission(new).await?;
        self.generation += 1;
        self.submissions.insert(
            0,
            CacheEntry {
                record: record.clone(),
                generation: self.generation,
            },
        );
        Ok(record)
    }

    /// Full-record edit: overlay the form onto the cached record,
    /// optimistically replace it, then persist every content field.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::apply_submission_action`].
    pub async fn edit_submission(
        &mut self,
        id: &str,
        edit: &SubmissionEdit,
    ) -> Result<BrandSubmission, EngineError> {
        let entry = self
            .submissions
            .iter_mut()
            .find(|e| e.record.id == id)
            .ok_or_else(|| EngineError::NotFound(id.to_owned()))?;

        let mut updated = entry.record.clone();
        updated.name = edit.name.clone();
        updated.category = edit.category;
        updated.purpose = edit.purpose.clone();
        updated.purpose_km = edit.purpose_km.clone();
        updated.location = edit.location.clone();
        updated.location_km = edit.location_km.clone();
        updated.website = edit.website.clone();
        updated.description = edit.description.clone();
        updated.description_km = edit.description_km.clone();
        updated.image_url = edit.image_url.clone();
        updated.evidence_url = edit.evidence_url.clone();
        if let Some(status) = edit.status {
            updated.status = status;
        }
        if let Some(ref submitted_by) = edit.submitted_by {
            updated.submitted_by = submitted_by.clone();
        }

        entry.record = updated.clone();
        self.generation += 1;
        entry.generation = self.generation;

        let persisted = self.store.update_submission(&updated).await;
        if let Err(error) = persisted {
            tracing::warn!(id, %error, "submission edit persist failed, refetching record");
            self.refetch_submission(id).await;
            return Err(error.into());
        }
        Ok(updated)
    }

    /// Hard-delete a submission. Once the store confirms, the record is gone
    /// from both sides; there is no undo.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotFound`] if the id is not in the snapshot, or
    /// [`EngineError::Store`] if the delete fails (the record is refetched
    /// back into the snapshot if it still exists).
    pub async fn delete_submission(&mut self, id: &str) -> Result<(), EngineError> {
        if self.submission(id).is_none() {
            return Err(EngineError::NotFound(id.to_owned()));
        }
        self.submissions.retain(|e| e.record.id != id);

        let persisted = self.store.delete_submission(id).await;
        if let Err(error) = persisted {
            tracing::warn!(id, %error, "submission delete failed, refetching record");
            self.refetch_submission(id).await;
            return Err(error.into());
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Issue reports
    // -----------------------------------------------------------------------

    /// Apply a workflow action to one report; same optimistic/rollback
    /// contract as [`Self::apply_submission_action`].
    ///
    /// # Errors
    ///
    /// See [`Self::apply_submission_action`].
    pub async fn apply_report_action(
        &mut self,
        id: &str,
        action: ReportAction,
    ) -> Result<ReportStatus, EngineError> {
        let entry = self
            .reports
            .iter_mut()
            .find(|e| e.record.id == id)
            .ok_or_else(|| EngineError::NotFound(id.to_owned()))?;
        let current = entry.record.status;
        let next = current.apply(action)?;
        if next == current {
            return Ok(current);
        }

        entry.record.status = next;
        self.generation += 1;
        entry.generation = self.generation;

        let persisted = self.store.update_report_status(id, next).await;
        if let Err(error) = persisted {
            tracing::warn!(id, %error, "report status persist failed, refetching record");
            self.refetch_report(id).await;
            return Err(error.into());
        }
        Ok(next)
    }

    /// Hard-delete a report.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::delete_submission`].
    pub async fn delete_report(&mut self, id: &str) -> Result<(), EngineError> {
        if self.report(id).is_none() {
            return Err(EngineError::NotFound(id.to_owned()));
        }
        self.reports.retain(|e| e.record.id != id);

        let persisted = self.store.delete_report(id).await;
        if let Err(error) = persisted {
            tracing::warn!(id, %error, "report delete failed, refetching record");
            self.refetch_report(id).await;
            return Err(error.into());
        }
        Ok(())
    }

    /// Compound admin shortcut: delete the brand a report points at, then —
    /// only if that delete succeeded — mark the report resolved. A failed
    /// brand delete leaves the report untouched. The referenced brand being
    /// already gone counts as success (reports outlive their brands by
    /// design).
    ///
    /// # Errors
    ///
    /// [`EngineError::NotFound`] if the report is not in the snapshot, or
    /// [`EngineError::Store`] from either step; after a failed resolve the
    /// brand stays deleted and the report is refetched.
    pub async fn delete_target_brand(&mut self, report_id: &str) -> Result<(), EngineError> {
        let brand_id = self
            .report(report_id)
            .map(|r| r.brand_id.clone())
            .ok_or_else(|| EngineError::NotFound(report_id.to_owned()))?;

        // Step 1: delete the referenced brand. Nothing is touched locally
        // until the store confirms.
        self.store.delete_submission(&brand_id).await?;
        self.submissions.retain(|e| e.record.id != brand_id);

        // Step 2: resolve the report. The compound action may resolve from
        // any state, so this bypasses the per-action transition table.
        let entry = self
            .reports
            .iter_mut()
            .find(|e| e.record.id == report_id)
            .ok_or_else(|| EngineError::NotFound(report_id.to_owned()))?;
        if entry.record.status == ReportStatus::Resolved {
            return Ok(());
        }
        entry.record.status = ReportStatus::Resolved;
        self.generation += 1;
        entry.generation = self.generation;

        let persisted = self
            .store
            .update_report_status(report_id, ReportStatus::Resolved)
            .await;
        if let Err(error) = persisted {
            tracing::warn!(report_id, %error, "report resolve persist failed, refetching record");
            self.refetch_report(report_id).await;
            return Err(error.into());
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Targeted rollback
    // -----------------------------------------------------------------------

    async fn refetch_submission(&mut self, id: &str) {
        self.generation += 1;
        let generation = self.generation;
        let fetched = self.store.get_submission(id).await;
        match fetched {
            Ok(Some(record)) => {
                if let Some(entry) = self.submissions.iter_mut().find(|e| e.record.id == id) {
                    entry.record = record;
                    entry.generation = generation;
                } else {
                    self.submissions.insert(0, CacheEntry { record, generation });
                }
            }
            Ok(None) => self.submissions.retain(|e| e.record.id != id),
            Err(error) => {
                // Refetch also failed: drop the stale entry so the snapshot
                // never silently diverges from the store.
                tracing::warn!(id, %error, "rollback refetch failed, evicting cache entry");
                self.submissions.retain(|e| e.record.id != id);
            }
        }
    }

    async fn refetch_report(&mut self, id: &str) {
        self.generation += 1;
        let generation = self.generation;
        let fetched = self.store.get_report(id).await;
        match fetched {
            Ok(Some(record)) => {
                if let Some(entry) = self.reports.iter_mut().find(|e| e.record.id == id) {
                    entry.record = record;
                    entry.generation = generation;
                } else {
                    self.reports.insert(0, CacheEntry { record, generation });
                }
            }
            Ok(None) => self.reports.retain(|e| e.record.id != id),
            Err(error) => {
                tracing::warn!(id, %error, "rollback refetch failed, evicting cache entry");
                self.reports.retain(|e| e.record.id != id);
            }
        }
    }
}

#[cfg(test)]
mod tests;
