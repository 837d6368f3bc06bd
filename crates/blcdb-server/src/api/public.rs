//! Public surfaces: the approved listing, brand detail, and the AI scan.
//!
//! The listing is the only read path allowed to degrade to the bundled
//! seed catalog; the response carries a `source` flag so the client can
//! show the offline/fallback indicator.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use blcdb_core::{DisplayBrand, SubmissionQuery, SubmissionStatus};
use blcdb_store::{load_public_listing, ListingSource};

use crate::middleware::RequestId;

use super::{
    map_store_error, parse_category, parse_locale, parse_sort, ApiError, ApiResponse, AppState,
    ResponseMeta,
};

#[derive(Debug, Default, Deserialize)]
pub(in crate::api) struct ListingParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
    pub locale: Option<String>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct PublicListing {
    pub source: ListingSource,
    pub items: Vec<DisplayBrand>,
}

/// GET /api/v1/brands — the approved public listing.
pub(in crate::api) async fn list_brands(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ListingParams>,
) -> Result<Json<ApiResponse<PublicListing>>, ApiError> {
    let rid = &req_id.0;
    let locale = parse_locale(rid, params.locale.as_deref())?;
    let query = SubmissionQuery {
        search: params.search.unwrap_or_default(),
        category: parse_category(rid, params.category.as_deref())?,
        // The listing is already approved-only; no status filter on top.
        status: None,
        sort: parse_sort(rid, params.sort.as_deref())?,
    };

    let (records, source) = load_public_listing(state.store.as_ref(), &state.seed).await;
    let filtered = blcdb_core::filter_submissions(&records, &query);
    let items = filtered
        .iter()
        .map(|record| DisplayBrand::project(record, locale))
        .collect();

    Ok(Json(ApiResponse {
        data: PublicListing { source, items },
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Default, Deserialize)]
pub(in crate::api) struct DetailParams {
    pub locale: Option<String>,
}

/// GET /api/v1/brands/:id — detail view of one approved brand.
pub(in crate::api) async fn get_brand(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    Query(params): Query<DetailParams>,
) -> Result<Json<ApiResponse<DisplayBrand>>, ApiError> {
    let rid = &req_id.0;
    let locale = parse_locale(rid, params.locale.as_deref())?;

    let record = state
        .store
        .get_submission(&id)
        .await
        .map_err(|e| map_store_error(rid.clone(), &e))?
        .filter(|record| record.status == SubmissionStatus::Approved)
        .ok_or_else(|| ApiError::new(rid, "not_found", format!("no listing with id {id}")))?;

    Ok(Json(ApiResponse {
        data: DisplayBrand::project(&record, locale),
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(in crate::api) struct ScanRequest {
    pub image_base64: String,
}

/// POST /api/v1/scan — best-effort AI brand classification.
///
/// Fail-closed: a missing key or upstream failure degrades to a
/// `service_unavailable` error, never a crash of the host view.
pub(in crate::api) async fn scan(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ScanRequest>,
) -> Result<(StatusCode, Json<ApiResponse<blcdb_vision::ScanVerdict>>), ApiError> {
    let rid = &req_id.0;

    let Some(vision) = state.vision.as_ref() else {
        return Err(ApiError::new(
            rid,
            "service_unavailable",
            "the scanner is not configured",
        ));
    };
    if body.image_base64.trim().is_empty() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "imageBase64 must be non-empty",
        ));
    }

    let verdict = vision
        .classify_brand(&body.image_base64)
        .await
        .map_err(|error| {
            tracing::warn!(%error, "vision classification failed");
            ApiError::new(rid, "service_unavailable", "the scanner is unavailable")
        })?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse {
            data: verdict,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}
