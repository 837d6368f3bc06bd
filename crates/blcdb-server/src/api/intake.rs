//! Authenticated intake endpoints: new brand submissions and issue reports.
//!
//! Validation happens entirely here, before any store call; a rejected
//! draft never leaves the process.

use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use blcdb_core::{
    validate_brand_draft, validate_report_draft, AuthSession, BrandDraft, ReportDraft,
};

use crate::middleware::RequestId;

use super::{
    map_store_error, map_validation_error, ApiError, ApiResponse, AppState, ResponseMeta,
};

#[derive(Debug, Serialize)]
pub(in crate::api) struct CreatedResponse {
    pub id: String,
}

/// POST /api/v1/submissions — end-user brand submission; always pending.
pub(in crate::api) async fn submit_brand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<AuthSession>,
    Json(draft): Json<BrandDraft>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedResponse>>), ApiError> {
    let rid = &req_id.0;

    let new = validate_brand_draft(&draft, &session.subject)
        .map_err(|e| map_validation_error(rid.clone(), &e))?;
    let record = state
        .store
        .insert_submission(&new)
        .await
        .map_err(|e| map_store_error(rid.clone(), &e))?;

    tracing::info!(id = %record.id, submitted_by = %record.submitted_by, "new brand submission");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: CreatedResponse { id: record.id },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(in crate::api) struct ReportRequest {
    pub brand_id: String,
    #[serde(flatten)]
    pub draft: ReportDraft,
}

/// POST /api/v1/reports — file an issue report against one brand. The
/// brand's name and image are snapshotted into the report at this moment.
pub(in crate::api) async fn submit_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(_session): Extension<AuthSession>,
    Json(body): Json<ReportRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedResponse>>), ApiError> {
    let rid = &req_id.0;

    let brand = state
        .store
        .get_submission(&body.brand_id)
        .await
        .map_err(|e| map_store_error(rid.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                rid,
                "not_found",
                format!("no listing with id {}", body.brand_id),
            )
        })?;

    let new = validate_report_draft(&body.draft, &brand)
        .map_err(|e| map_validation_error(rid.clone(), &e))?;
    let record = state
        .store
        .insert_report(&new)
        .await
        .map_err(|e| map_store_error(rid.clone(), &e))?;

    tracing::info!(id = %record.id, brand_id = %record.brand_id, "new issue report");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: CreatedResponse { id: record.id },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}
