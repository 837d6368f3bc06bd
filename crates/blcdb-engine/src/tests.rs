//! Engine tests against an in-memory store with failure injection.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use blcdb_core::{
    Category, IssueReport, NewReport, NewSubmission, ReportAction, ReportReason, ReportStatus,
    SubmissionAction, SubmissionEdit, SubmissionStatus,
};
use blcdb_store::{RecordStore, StoreError};

use super::{EngineError, ModerationEngine};

// ---------------------------------------------------------------------------
// In-memory store with switchable failures
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryStore {
    submissions: Mutex<Vec<blcdb_core::BrandSubmission>>,
    reports: Mutex<Vec<IssueReport>>,
    next_id: AtomicUsize,
    fail_submission_writes: AtomicBool,
    fail_brand_deletes: AtomicBool,
    fail_report_writes: AtomicBool,
    submission_write_calls: AtomicUsize,
}

impl MemoryStore {
    fn write_failure() -> StoreError {
        StoreError::Io {
            path: "memory".to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "injected failure"),
        }
    }

    fn fresh_submissions(&self) -> Vec<blcdb_core::BrandSubmission> {
        self.submissions.lock().expect("lock").clone()
    }

    fn fresh_reports(&self) -> Vec<IssueReport> {
        self.reports.lock().expect("lock").clone()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn health(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list_submissions(
        &self,
        status: Option<SubmissionStatus>,
    ) -> Result<Vec<blcdb_core::BrandSubmission>, StoreError> {
        let mut list = self.fresh_submissions();
        if let Some(status) = status {
            list.retain(|s| s.status == status);
        }
        Ok(list)
    }

    async fn get_submission(
        &self,
        id: &str,
    ) -> Result<Option<blcdb_core::BrandSubmission>, StoreError> {
        Ok(self.fresh_submissions().into_iter().find(|s| s.id == id))
    }

    async fn insert_submission(
        &self,
        new: &NewSubmission,
    ) -> Result<blcdb_core::BrandSubmission, StoreError> {
        let id = format!("mem-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let record = blcdb_core::BrandSubmission {
            id,
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
        self.submissions.lock().expect("lock").insert(0, record.clone());
        Ok(record)
    }

    async fn update_submission(
        &self,
        record: &blcdb_core::BrandSubmission,
    ) -> Result<(), StoreError> {
        self.submission_write_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_submission_writes.load(Ordering::SeqCst) {
            return Err(Self::write_failure());
        }
        let mut list = self.submissions.lock().expect("lock");
        let slot = list
            .iter_mut()
            .find(|s| s.id == record.id)
            .ok_or_else(|| StoreError::NotFound(record.id.clone()))?;
        *slot = record.clone();
        Ok(())
    }

    async fn update_submission_status(
        &self,
        id: &str,
        status: SubmissionStatus,
    ) -> Result<(), StoreError> {
        self.submission_write_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_submission_writes.load(Ordering::SeqCst) {
            return Err(Self::write_failure());
        }
        let mut list = self.submissions.lock().expect("lock");
        let slot = list
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))?;
        slot.status = status;
        Ok(())
    }

    async fn delete_submission(&self, id: &str) -> Result<(), StoreError> {
        if self.fail_brand_deletes.load(Ordering::SeqCst) {
            return Err(Self::write_failure());
        }
        self.submissions.lock().expect("lock").retain(|s| s.id != id);
        Ok(())
    }

    async fn list_reports(
        &self,
        status: Option<ReportStatus>,
    ) -> Result<Vec<IssueReport>, StoreError> {
        let mut list = self.fresh_reports();
        if let Some(status) = status {
            list.retain(|r| r.status == status);
        }
        Ok(list)
    }

    async fn get_report(&self, id: &str) -> Result<Option<IssueReport>, StoreError> {
        Ok(self.fresh_reports().into_iter().find(|r| r.id == id))
    }

    async fn insert_report(&self, new: &NewReport) -> Result<IssueReport, StoreError> {
        let id = format!("mem-r-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let record = IssueReport {
            id,
            brand_id: new.brand_id.clone(),
            brand_name: new.brand_name.clone(),
            brand_image: new.brand_image.clone(),
            reason: new.reason,
            details: new.details.clone(),
            email: new.email.clone(),
            status: new.status,
            submitted_at: Utc::now(),
        };
        self.reports.lock().expect("lock").insert(0, record.clone());
        Ok(record)
    }

    async fn update_report_status(
        &self,
        id: &str,
        status: ReportStatus,
    ) -> Result<(), StoreError> {
        if self.fail_report_writes.load(Ordering::SeqCst) {
            return Err(Self::write_failure());
        }
        let mut list = self.reports.lock().expect("lock");
        let slot = list
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))?;
        slot.status = status;
        Ok(())
    }

    async fn delete_report(&self, id: &str) -> Result<(), StoreError> {
        self.reports.lock().expect("lock").retain(|r| r.id != id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn submission(name: &str, status: SubmissionStatus) -> NewSubmission {
    NewSubmission {
        name: name.to_owned(),
        category: Category::CafesRestaurants,
        purpose: "Bubble Tea Franchise".to_owned(),
        purpose_km: String::new(),
        location: "Phnom Penh".to_owned(),
        location_km: String::new(),
        website: String::new(),
        description: String::new(),
        description_km: String::new(),
        image_url: None,
        evidence_url: None,
        status,
        submitted_by: "tests".to_owned(),
    }
}

async fn engine_with_pending_brand() -> (Arc<MemoryStore>, ModerationEngine, String) {
    let store = Arc::new(MemoryStore::default());
    let brand = store
        .insert_submission(&submission("Thai Tea Express", SubmissionStatus::Pending))
        .await
        .expect("insert");
    let mut engine = ModerationEngine::new(store.clone());
    engine.ensure_loaded().await.expect("load");
    (store, engine, brand.id)
}

async fn report_for(store: &MemoryStore, brand_id: &str) -> IssueReport {
    store
        .insert_report(&NewReport {
            brand_id: brand_id.to_owned(),
            brand_name: "Thai Tea Express".to_owned(),
            brand_image: None,
            reason: ReportReason::NotThai,
            details: "Actually locally owned".to_owned(),
            email: None,
            status: ReportStatus::Pending,
        })
        .await
        .expect("insert report")
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn approve_updates_cache_and_store() {
    let (store, mut engine, id) = engine_with_pending_brand().await;

    let next = engine
        .apply_submission_action(&id, SubmissionAction::Approve)
        .await
        .expect("approve");
    assert_eq!(next, SubmissionStatus::Approved);
    assert_eq!(
        engine.submission(&id).expect("cached").status,
        SubmissionStatus::Approved
    );
    assert_eq!(
        store.fresh_submissions()[0].status,
        SubmissionStatus::Approved
    );
}

#[tokio::test]
async fn failed_persist_rolls_the_cache_back_to_the_store_state() {
    let (store, mut engine, id) = engine_with_pending_brand().await;
    store.fail_submission_writes.store(true, Ordering::SeqCst);

    let err = engine
        .apply_submission_action(&id, SubmissionAction::Approve)
        .await
        .expect_err("persist must fail");
    assert!(matches!(err, EngineError::Store(_)));

    // After the failure resolves, local state matches a fresh list() exactly:
    // the optimistic change was discarded.
    assert_eq!(engine.submissions(), store.fresh_submissions());
    assert_eq!(
        engine.submission(&id).expect("cached").status,
        SubmissionStatus::Pending
    );
}

#[tokio::test]
async fn illegal_transition_touches_nothing() {
    let (store, mut engine, id) = engine_with_pending_brand().await;
    engine
        .apply_submission_action(&id, SubmissionAction::Reject)
        .await
        .expect("reject");
    let writes_before = store.submission_write_calls.load(Ordering::SeqCst);

    let err = engine
        .apply_submission_action(&id, SubmissionAction::Approve)
        .await
        .expect_err("rejected records cannot be approved directly");
    assert!(matches!(err, EngineError::IllegalTransition(_)));
    assert_eq!(
        engine.submission(&id).expect("cached").status,
        SubmissionStatus::Rejected
    );
    assert_eq!(
        store.submission_write_calls.load(Ordering::SeqCst),
        writes_before,
        "no store call for an illegal transition"
    );
}

#[tokio::test]
async fn repeating_an_action_is_a_no_op_without_a_store_write() {
    let (store, mut engine, id) = engine_with_pending_brand().await;
    engine
        .apply_submission_action(&id, SubmissionAction::Approve)
        .await
        .expect("approve");
    let writes_before = store.submission_write_calls.load(Ordering::SeqCst);

    let next = engine
        .apply_submission_action(&id, SubmissionAction::Approve)
        .await
        .expect("second approve is a no-op");
    assert_eq!(next, SubmissionStatus::Approved);
    assert_eq!(
        store.submission_write_calls.load(Ordering::SeqCst),
        writes_before
    );
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let (_store, mut engine, _id) = engine_with_pending_brand().await;
    let err = engine
        .apply_submission_action("ghost", SubmissionAction::Approve)
        .await
        .expect_err("must fail");
    assert!(matches!(err, EngineError::NotFound(id) if id == "ghost"));
}

// ---------------------------------------------------------------------------
// Create / edit / delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_adds_to_the_snapshot() {
    let store = Arc::new(MemoryStore::default());
    let mut engine = ModerationEngine::new(store.clone());
    engine.ensure_loaded().await.expect("load");

    let created = engine
        .create_submission(&submission("Admin Mart", SubmissionStatus::Approved))
        .await
        .expect("create");
    assert_eq!(engine.submissions().len(), 1);
    assert_eq!(engine.submission(&created.id).expect("cached").name, "Admin Mart");
    assert_eq!(store.fresh_submissions().len(), 1);
}

#[tokio::test]
async fn edit_overlays_the_form_and_persists() {
    let (store, mut engine, id) = engine_with_pending_brand().await;

    let edit = SubmissionEdit {
        name: "Thai Tea Express (PP)".to_owned(),
        category: Category::FoodBeverage,
        purpose: "Tea and snacks".to_owned(),
        purpose_km: String::new(),
        location: "Phnom Penh".to_owned(),
        location_km: String::new(),
        website: "https://example.com".to_owned(),
        description: String::new(),
        description_km: String::new(),
        image_url: None,
        evidence_url: None,
        status: Some(SubmissionStatus::Approved),
        submitted_by: None,
    };
    let updated = engine.edit_submission(&id, &edit).await.expect("edit");
    assert_eq!(updated.name, "Thai Tea Express (PP)");
    assert_eq!(updated.status, SubmissionStatus::Approved);
    assert_eq!(updated.submitted_by, "tests", "unset fields keep their value");
    assert_eq!(store.fresh_submissions()[0].name, "Thai Tea Express (PP)");
}

#[tokio::test]
async fn failed_edit_rolls_back_via_refetch() {
    let (store, mut engine, id) = engine_with_pending_brand().await;
    store.fail_submission_writes.store(true, Ordering::SeqCst);

    let edit = SubmissionEdit {
        name: "Renamed".to_owned(),
        category: Category::Retail,
        purpose: String::new(),
        purpose_km: String::new(),
        location: String::new(),
        location_km: String::new(),
        website: String::new(),
        description: String::new(),
        description_km: String::new(),
        image_url: None,
        evidence_url: None,
        status: None,
        submitted_by: None,
    };
    engine
        .edit_submission(&id, &edit)
        .await
        .expect_err("edit must fail");
    assert_eq!(engine.submissions(), store.fresh_submissions());
    assert_eq!(engine.submission(&id).expect("cached").name, "Thai Tea Express");
}

#[tokio::test]
async fn delete_is_terminal_on_both_sides() {
    let (store, mut engine, id) = engine_with_pending_brand().await;

    engine.delete_submission(&id).await.expect("delete");
    assert!(engine.submission(&id).is_none());
    assert!(store.fresh_submissions().is_empty());

    let err = engine
        .delete_submission(&id)
        .await
        .expect_err("second delete finds nothing");
    assert!(matches!(err, EngineError::NotFound(_)));
}

// ---------------------------------------------------------------------------
// Reports and the compound action
// ---------------------------------------------------------------------------

#[tokio::test]
async fn report_workflow_round_trip() {
    let (store, mut engine, brand_id) = engine_with_pending_brand().await;
    let report = report_for(&store, &brand_id).await;
    engine.reload().await.expect("reload");

    let resolved = engine
        .apply_report_action(&report.id, ReportAction::Resolve)
        .await
        .expect("resolve");
    assert_eq!(resolved, ReportStatus::Resolved);

    let reopened = engine
        .apply_report_action(&report.id, ReportAction::Reopen)
        .await
        .expect("reopen");
    assert_eq!(reopened, ReportStatus::Pending);

    let dismissed = engine
        .apply_report_action(&report.id, ReportAction::Dismiss)
        .await
        .expect("dismiss");
    assert_eq!(dismissed, ReportStatus::Dismissed);
    assert_eq!(store.fresh_reports()[0].status, ReportStatus::Dismissed);
}

#[tokio::test]
async fn compound_delete_resolves_the_report_after_the_brand_is_gone() {
    let (store, mut engine, brand_id) = engine_with_pending_brand().await;
    let report = report_for(&store, &brand_id).await;
    engine.reload().await.expect("reload");

    engine
        .delete_target_brand(&report.id)
        .await
        .expect("compound delete");

    assert!(store.fresh_submissions().is_empty(), "brand hard-deleted");
    assert!(engine.submission(&brand_id).is_none());
    assert_eq!(store.fresh_reports()[0].status, ReportStatus::Resolved);
    assert_eq!(
        engine.report(&report.id).expect("cached").status,
        ReportStatus::Resolved
    );
}

#[tokio::test]
async fn compound_delete_failure_leaves_the_report_untouched() {
    let (store, mut engine, brand_id) = engine_with_pending_brand().await;
    let report = report_for(&store, &brand_id).await;
    engine.reload().await.expect("reload");
    store.fail_brand_deletes.store(true, Ordering::SeqCst);

    let err = engine
        .delete_target_brand(&report.id)
        .await
        .expect_err("brand delete must fail");
    assert!(matches!(err, EngineError::Store(_)));

    // The report transition must NOT have happened, anywhere.
    assert_eq!(
        engine.report(&report.id).expect("cached").status,
        ReportStatus::Pending
    );
    assert_eq!(store.fresh_reports()[0].status, ReportStatus::Pending);
    // And the brand is still present.
    assert_eq!(store.fresh_submissions().len(), 1);
    assert!(engine.submission(&brand_id).is_some());
}

#[tokio::test]
async fn compound_delete_tolerates_an_already_deleted_brand() {
    let (store, mut engine, brand_id) = engine_with_pending_brand().await;
    let report = report_for(&store, &brand_id).await;
    engine.reload().await.expect("reload");

    // Another moderator got there first.
    store.delete_submission(&brand_id).await.expect("delete brand");

    engine
        .delete_target_brand(&report.id)
        .await
        .expect("compound delete still succeeds");
    assert_eq!(store.fresh_reports()[0].status, ReportStatus::Resolved);
}
