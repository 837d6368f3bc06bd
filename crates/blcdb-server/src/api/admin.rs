//! Admin moderation endpoints.
//!
//! Every handler here reloads or lazily loads the engine snapshot, applies
//! the action through the moderation engine, and surfaces store failures —
//! the dashboard never silently falls back to stale or seed data.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use blcdb_core::{
    validate_submission_edit, AuthSession, BrandSubmission, IssueReport, NewSubmission,
    ReportAction, ReportQuery, ReportStatus, SubmissionAction, SubmissionEdit, SubmissionQuery,
    SubmissionStatus,
};
use blcdb_engine::EngineError;

use crate::middleware::RequestId;

use super::{
    map_engine_error, map_store_error, map_validation_error, parse_category, parse_sort, ApiError,
    ApiResponse, AppState, ResponseMeta,
};

// ---------------------------------------------------------------------------
// Request/response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub(in crate::api) struct AdminListParams {
    pub search: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct SubmissionTransitionRequest {
    pub action: SubmissionAction,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct ReportTransitionRequest {
    pub action: ReportAction,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct StatusResponse<S: Serialize> {
    pub id: String,
    pub status: S,
}

fn parse_submission_status(
    request_id: &str,
    raw: Option<&str>,
) -> Result<Option<SubmissionStatus>, ApiError> {
    match raw {
        None | Some("all") => Ok(None),
        Some(value) => SubmissionStatus::parse(value).map(Some).ok_or_else(|| {
            ApiError::new(
                request_id,
                "validation_error",
                format!("unknown submission status '{value}'"),
            )
        }),
    }
}

fn parse_report_status(
    request_id: &str,
    raw: Option<&str>,
) -> Result<Option<ReportStatus>, ApiError> {
    match raw {
        None | Some("all") => Ok(None),
        Some(value) => ReportStatus::parse(value).map(Some).ok_or_else(|| {
            ApiError::new(
                request_id,
                "validation_error",
                format!("unknown report status '{value}'"),
            )
        }),
    }
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/submissions — full moderation listing, fresh fetch.
pub(in crate::api) async fn list_submissions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<AdminListParams>,
) -> Result<Json<ApiResponse<Vec<BrandSubmission>>>, ApiError> {
    let rid = &req_id.0;
    let query = SubmissionQuery {
        search: params.search.unwrap_or_default(),
        category: parse_category(rid, params.category.as_deref())?,
        status: parse_submission_status(rid, params.status.as_deref())?,
        sort: parse_sort(rid, params.sort.as_deref())?,
    };

    let mut engine = state.engine.lock().await;
    engine
        .reload()
        .await
        .map_err(|e| map_store_error(rid.clone(), &e))?;
    let data = engine.query_submissions(&query);

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// GET /api/v1/admin/reports — full report listing, fresh fetch.
pub(in crate::api) async fn list_reports(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<AdminListParams>,
) -> Result<Json<ApiResponse<Vec<IssueReport>>>, ApiError> {
    let rid = &req_id.0;
    let query = ReportQuery {
        search: params.search.unwrap_or_default(),
        status: parse_report_status(rid, params.status.as_deref())?,
        sort: parse_sort(rid, params.sort.as_deref())?,
    };

    let mut engine = state.engine.lock().await;
    engine
        .reload()
        .await
        .map_err(|e| map_store_error(rid.clone(), &e))?;
    let data = engine.query_reports(&query);

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/submissions — create a listing directly. Unlike
/// end-user intake, admin-created records default to approved.
pub(in crate::api) async fn create_submission(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<AuthSession>,
    Json(edit): Json<SubmissionEdit>,
) -> Result<(StatusCode, Json<ApiResponse<BrandSubmission>>), ApiError> {
    let rid = &req_id.0;
    let edit = validate_submission_edit(&edit).map_err(|e| map_validation_error(rid.clone(), &e))?;

    let new = NewSubmission {
        name: edit.name.clone(),
        category: edit.category,
        purpose: edit.purpose.clone(),
        purpose_km: edit.purpose_km.clone(),
        location: edit.location.clone(),
        location_km: edit.location_km.clone(),
        website: edit.website.clone(),
        description: edit.description.clone(),
        description_km: edit.description_km.clone(),
        image_url: edit.image_url.clone(),
        evidence_url: edit.evidence_url.clone(),
        status: edit.status.unwrap_or(SubmissionStatus::Approved),
        submitted_by: edit.submitted_by.clone().unwrap_or_else(|| session.subject.clone()),
    };

    let mut engine = state.engine.lock().await;
    engine
        .ensure_loaded()
        .await
        .map_err(|e| map_store_error(rid.clone(), &e))?;
    let record = engine
        .create_submission(&new)
        .await
        .map_err(|e| map_engine_error(rid.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: record,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// PATCH /api/v1/admin/submissions/:id — full-record edit.
pub(in crate::api) async fn edit_submission(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    Json(edit): Json<SubmissionEdit>,
) -> Result<Json<ApiResponse<BrandSubmission>>, ApiError> {
    let rid = &req_id.0;
    let edit = validate_submission_edit(&edit).map_err(|e| map_validation_error(rid.clone(), &e))?;

    let mut engine = state.engine.lock().await;
    engine
        .ensure_loaded()
        .await
        .map_err(|e| map_store_error(rid.clone(), &e))?;
    // The snapshot may predate this record; refresh once before giving up.
    let first = engine.edit_submission(&id, &edit).await;
    let result = match first {
        Err(EngineError::NotFound(_)) => {
            engine
                .reload()
                .await
                .map_err(|e| map_store_error(rid.clone(), &e))?;
            engine.edit_submission(&id, &edit).await
        }
        other => other,
    };
    let record = result.map_err(|e| map_engine_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: record,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/admin/submissions/:id/transition — apply a workflow action.
pub(in crate::api) async fn transition_submission(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    Json(body): Json<SubmissionTransitionRequest>,
) -> Result<Json<ApiResponse<StatusResponse<SubmissionStatus>>>, ApiError> {
    let rid = &req_id.0;

    let mut engine = state.engine.lock().await;
    engine
        .ensure_loaded()
        .await
        .map_err(|e| map_store_error(rid.clone(), &e))?;
    let first = engine.apply_submission_action(&id, body.action).await;
    let result = match first {
        Err(EngineError::NotFound(_)) => {
            engine
                .reload()
                .await
                .map_err(|e| map_store_error(rid.clone(), &e))?;
            engine.apply_submission_action(&id, body.action).await
        }
        other => other,
    };
    let status = result.map_err(|e| map_engine_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: StatusResponse { id, status },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// DELETE /api/v1/admin/submissions/:id — hard delete, no undo.
pub(in crate::api) async fn delete_submission(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;

    let mut engine = state.engine.lock().await;
    engine
        .ensure_loaded()
        .await
        .map_err(|e| map_store_error(rid.clone(), &e))?;
    let first = engine.delete_submission(&id).await;
    let result = match first {
        Err(EngineError::NotFound(_)) => {
            engine
                .reload()
                .await
                .map_err(|e| map_store_error(rid.clone(), &e))?;
            engine.delete_submission(&id).await
        }
        other => other,
    };
    result.map_err(|e| map_engine_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: serde_json::json!({ "deleted": true }),
        meta: ResponseMeta::new(req_id.0),
    }))
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/reports/:id/transition — apply a workflow action.
pub(in crate::api) async fn transition_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    Json(body): Json<ReportTransitionRequest>,
) -> Result<Json<ApiResponse<StatusResponse<ReportStatus>>>, ApiError> {
    let rid = &req_id.0;

    let mut engine = state.engine.lock().await;
    engine
        .ensure_loaded()
        .await
        .map_err(|e| map_store_error(rid.clone(), &e))?;
    let first = engine.apply_report_action(&id, body.action).await;
    let result = match first {
        Err(EngineError::NotFound(_)) => {
            engine
                .reload()
                .await
                .map_err(|e| map_store_error(rid.clone(), &e))?;
            engine.apply_report_action(&id, body.action).await
        }
        other => other,
    };
    let status = result.map_err(|e| map_engine_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: StatusResponse { id, status },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// DELETE /api/v1/admin/reports/:id — hard delete.
pub(in crate::api) async fn delete_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;

    let mut engine = state.engine.lock().await;
    engine
        .ensure_loaded()
        .await
        .map_err(|e| map_store_error(rid.clone(), &e))?;
    let first = engine.delete_report(&id).await;
    let result = match first {
        Err(EngineError::NotFound(_)) => {
            engine
                .reload()
                .await
                .map_err(|e| map_store_error(rid.clone(), &e))?;
            engine.delete_report(&id).await
        }
        other => other,
    };
    result.map_err(|e| map_engine_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: serde_json::json!({ "deleted": true }),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/admin/reports/:id/delete-target-brand — compound shortcut:
/// delete the referenced brand, then mark the report resolved. If the brand
/// delete fails the report is left untouched.
pub(in crate::api) async fn delete_target_brand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;

    let mut engine = state.engine.lock().await;
    engine
        .ensure_loaded()
        .await
        .map_err(|e| map_store_error(rid.clone(), &e))?;
    let first = engine.delete_target_brand(&id).await;
    let result = match first {
        Err(EngineError::NotFound(_)) => {
            engine
                .reload()
                .await
                .map_err(|e| map_store_error(rid.clone(), &e))?;
            engine.delete_target_brand(&id).await
        }
        other => other,
    };
    result.map_err(|e| map_engine_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: serde_json::json!({ "brandDeleted": true, "reportResolved": true }),
        meta: ResponseMeta::new(req_id.0),
    }))
}
