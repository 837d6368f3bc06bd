mod admin;
mod intake;
mod public;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use blcdb_core::{BrandSubmission, Category, Locale, SortOrder, ValidationError};
use blcdb_engine::{EngineError, ModerationEngine};
use blcdb_store::{RecordStore, StoreError};
use blcdb_vision::VisionClient;

use crate::middleware::{
    enforce_rate_limit, request_id, require_admin, require_user, AuthState, RateLimitState,
    RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub engine: Arc<Mutex<ModerationEngine>>,
    pub seed: Arc<Vec<BrandSubmission>>,
    pub vision: Option<Arc<VisionClient>>,
}

impl AppState {
    #[must_use]
    pub fn new(
        store: Arc<dyn RecordStore>,
        seed: Vec<BrandSubmission>,
        vision: Option<Arc<VisionClient>>,
    ) -> Self {
        Self {
            engine: Arc::new(Mutex::new(ModerationEngine::new(store.clone()))),
            store,
            seed: Arc::new(seed),
            vision,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    store: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "forbidden" => StatusCode::FORBIDDEN,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" | "illegal_transition" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "service_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

pub(super) fn map_store_error(request_id: String, error: &StoreError) -> ApiError {
    tracing::error!(error = %error, "store operation failed");
    ApiError::new(request_id, "internal_error", "store operation failed")
}

pub(super) fn map_engine_error(request_id: String, error: &EngineError) -> ApiError {
    match error {
        EngineError::NotFound(id) => {
            ApiError::new(request_id, "not_found", format!("no record with id {id}"))
        }
        EngineError::IllegalTransition(illegal) => {
            ApiError::new(request_id, "illegal_transition", illegal.to_string())
        }
        EngineError::Store(store) => map_store_error(request_id, store),
    }
}

pub(super) fn map_validation_error(request_id: String, error: &ValidationError) -> ApiError {
    ApiError::new(request_id, "validation_error", error.to_string())
}

// ---------------------------------------------------------------------------
// Query-parameter parsing
// ---------------------------------------------------------------------------

/// Parse a `sort` query value; absent or `newest` is the default order.
pub(super) fn parse_sort(request_id: &str, raw: Option<&str>) -> Result<SortOrder, ApiError> {
    match raw {
        None | Some("newest") => Ok(SortOrder::Newest),
        Some("oldest") => Ok(SortOrder::Oldest),
        Some(other) => Err(ApiError::new(
            request_id,
            "validation_error",
            format!("sort must be 'newest' or 'oldest', got '{other}'"),
        )),
    }
}

/// Parse a `locale` query value; absent means English.
pub(super) fn parse_locale(request_id: &str, raw: Option<&str>) -> Result<Locale, ApiError> {
    match raw {
        None => Ok(Locale::En),
        Some(value) => Locale::parse(value).ok_or_else(|| {
            ApiError::new(
                request_id,
                "validation_error",
                format!("locale must be 'en' or 'km', got '{value}'"),
            )
        }),
    }
}

/// Parse a `category` query value; absent or `all` matches everything.
pub(super) fn parse_category(
    request_id: &str,
    raw: Option<&str>,
) -> Result<Option<Category>, ApiError> {
    match raw {
        None | Some("all") | Some("All") => Ok(None),
        Some(label) => Category::from_label(label).map(Some).ok_or_else(|| {
            ApiError::new(
                request_id,
                "validation_error",
                format!("unknown category '{label}'"),
            )
        }),
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn intake_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/submissions", post(intake::submit_brand))
        .route("/api/v1/reports", post(intake::submit_report))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(auth, require_user)),
        )
}

fn admin_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/admin/submissions",
            get(admin::list_submissions).post(admin::create_submission),
        )
        .route(
            "/api/v1/admin/submissions/{id}",
            axum::routing::patch(admin::edit_submission).delete(admin::delete_submission),
        )
        .route(
            "/api/v1/admin/submissions/{id}/transition",
            post(admin::transition_submission),
        )
        .route("/api/v1/admin/reports", get(admin::list_reports))
        .route(
            "/api/v1/admin/reports/{id}",
            axum::routing::delete(admin::delete_report),
        )
        .route(
            "/api/v1/admin/reports/{id}/transition",
            post(admin::transition_report),
        )
        .route(
            "/api/v1/admin/reports/{id}/delete-target-brand",
            post(admin::delete_target_brand),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(auth, require_admin)),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/brands", get(public::list_brands))
        .route("/api/v1/brands/{id}", get(public::get_brand))
        .route("/api/v1/scan", post(public::scan));

    Router::new()
        .merge(public_routes)
        .merge(intake_router(auth.clone(), rate_limit.clone()))
        .merge(admin_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match state.store.health().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    store: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        store: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}
