use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use uuid::Uuid;

use blcdb_core::{can_access_admin, AuthSession, Role};

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// One configured bearer token and the principal it authenticates as.
#[derive(Debug, Clone)]
struct TokenEntry {
    label: String,
    token: String,
    role: Role,
}

/// Bearer-token auth settings used by middleware. Tokens are issued
/// out-of-band and resolve to an explicit [`AuthSession`] carried in the
/// request extensions; nothing downstream reads ambient auth state.
#[derive(Clone)]
pub struct AuthState {
    tokens: Arc<Vec<TokenEntry>>,
    pub enabled: bool,
}

impl AuthState {
    /// Builds auth config from `BLCDB_ADMIN_TOKENS` / `BLCDB_USER_TOKENS`
    /// (comma-separated `label:token` entries).
    ///
    /// In development, empty/missing tokens disable auth for local
    /// iteration (every request acts as a dev admin). In non-development
    /// envs, empty/missing tokens fail startup.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed entries, or for a non-development
    /// environment with no tokens configured.
    pub fn from_env(is_development: bool) -> anyhow::Result<Self> {
        let admin_raw = std::env::var("BLCDB_ADMIN_TOKENS").unwrap_or_default();
        let user_raw = std::env::var("BLCDB_USER_TOKENS").unwrap_or_default();

        let mut tokens = parse_entries(&admin_raw, Role::Admin)?;
        tokens.extend(parse_entries(&user_raw, Role::User)?);

        if tokens.is_empty() {
            if is_development {
                tracing::warn!(
                    "BLCDB_ADMIN_TOKENS/BLCDB_USER_TOKENS not set; auth disabled in development"
                );
                return Ok(Self {
                    tokens: Arc::new(Vec::new()),
                    enabled: false,
                });
            }
            anyhow::bail!(
                "BLCDB_ADMIN_TOKENS is required outside development; \
                 provide comma-separated label:token entries"
            );
        }

        Ok(Self {
            tokens: Arc::new(tokens),
            enabled: true,
        })
    }

    /// Builds auth config from explicit `(label, token)` lists. Used by
    /// tests and by embedders that manage their own secrets.
    #[must_use]
    pub fn with_tokens(admin: Vec<(String, String)>, user: Vec<(String, String)>) -> Self {
        let tokens = admin
            .into_iter()
            .map(|(label, token)| TokenEntry {
                label,
                token,
                role: Role::Admin,
            })
            .chain(user.into_iter().map(|(label, token)| TokenEntry {
                label,
                token,
                role: Role::User,
            }))
            .collect();
        Self {
            tokens: Arc::new(tokens),
            enabled: true,
        }
    }

    /// Resolve a bearer token to a session. Token comparison is
    /// constant-time; every configured entry is checked so timing does not
    /// leak which token prefix matched.
    fn resolve(&self, candidate: &str) -> Option<AuthSession> {
        let mut matched: Option<&TokenEntry> = None;
        for entry in self.tokens.iter() {
            if token_eq(candidate, &entry.token) && matched.is_none() {
                matched = Some(entry);
            }
        }
        matched.map(|entry| AuthSession {
            subject: entry.label.clone(),
            name: entry.label.clone(),
            role: entry.role,
        })
    }

    fn dev_session() -> AuthSession {
        AuthSession {
            subject: "dev@localhost".to_owned(),
            name: "dev".to_owned(),
            role: Role::Admin,
        }
    }
}

fn parse_entries(raw: &str, role: Role) -> anyhow::Result<Vec<TokenEntry>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let (label, token) = entry.split_once(':').ok_or_else(|| {
                anyhow::anyhow!("token entry must be 'label:token', got '{entry}'")
            })?;
            if label.trim().is_empty() || token.trim().is_empty() {
                anyhow::bail!("token entry must be 'label:token', got '{entry}'");
            }
            Ok(TokenEntry {
                label: label.trim().to_owned(),
                token: token.trim().to_owned(),
                role,
            })
        })
        .collect()
}

fn token_eq(candidate: &str, known: &str) -> bool {
    candidate.len() == known.len()
        && candidate.as_bytes().ct_eq(known.as_bytes()).unwrap_u8() == 1
}

#[derive(Debug, Clone)]
struct RateLimitWindow {
    started_at: Instant,
    count: usize,
}

/// Fixed-window limiter for simple API protection.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    state: Arc<Mutex<RateLimitWindow>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Arc::new(Mutex::new(RateLimitWindow {
                started_at: Instant::now(),
                count: 0,
            })),
        }
    }
}

#[derive(Debug, Serialize)]
struct MiddlewareErrorBody {
    error: MiddlewareError,
}

#[derive(Debug, Serialize)]
struct MiddlewareError {
    code: &'static str,
    message: &'static str,
}

fn reject(status: StatusCode, code: &'static str, message: &'static str) -> Response {
    (
        status,
        Json(MiddlewareErrorBody {
            error: MiddlewareError { code, message },
        }),
    )
        .into_response()
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware requiring any authenticated session. The resolved
/// [`AuthSession`] is inserted into request extensions for handlers.
pub async fn require_user(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    if !auth.enabled {
        req.extensions_mut().insert(AuthState::dev_session());
        return next.run(req).await;
    }

    match resolve_session(&auth, &req) {
        Some(session) => {
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        None => reject(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "missing or invalid bearer token",
        ),
    }
}

/// Middleware requiring an authenticated admin session.
pub async fn require_admin(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    if !auth.enabled {
        req.extensions_mut().insert(AuthState::dev_session());
        return next.run(req).await;
    }

    match resolve_session(&auth, &req) {
        Some(session) if can_access_admin(&session) => {
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        Some(_) => reject(
            StatusCode::FORBIDDEN,
            "forbidden",
            "admin role required",
        ),
        None => reject(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "missing or invalid bearer token",
        ),
    }
}

/// Middleware enforcing a fixed request-per-window limit.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let mut window = rate_limit.state.lock().await;
    let elapsed = window.started_at.elapsed();

    if elapsed >= rate_limit.window {
        window.started_at = Instant::now();
        window.count = 0;
    }

    if window.count >= rate_limit.max_requests {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(MiddlewareErrorBody {
                error: MiddlewareError {
                    code: "rate_limited",
                    message: "rate limit exceeded",
                },
            }),
        )
            .into_response();
    }

    window.count += 1;
    drop(window);

    next.run(req).await
}

fn resolve_session(auth: &AuthState, req: &Request) -> Option<AuthSession> {
    extract_bearer_token(req.headers().get(AUTHORIZATION)).and_then(|token| auth.resolve(token))
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> AuthState {
        AuthState::with_tokens(
            vec![("dara".to_owned(), "admin-token".to_owned())],
            vec![("visal".to_owned(), "user-token".to_owned())],
        )
    }

    #[test]
    fn extract_bearer_token_accepts_valid_header() {
        let header = HeaderValue::from_static("Bearer test-token");
        assert_eq!(extract_bearer_token(Some(&header)), Some("test-token"));
    }

    #[test]
    fn extract_bearer_token_rejects_non_bearer_header() {
        let header = HeaderValue::from_static("Basic abc123");
        assert_eq!(extract_bearer_token(Some(&header)), None);
    }

    #[test]
    fn tokens_resolve_to_role_bearing_sessions() {
        let auth = auth();
        let admin = auth.resolve("admin-token").expect("admin resolves");
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.subject, "dara");
        assert!(can_access_admin(&admin));

        let user = auth.resolve("user-token").expect("user resolves");
        assert_eq!(user.role, Role::User);
        assert!(!can_access_admin(&user));

        assert!(auth.resolve("wrong-token").is_none());
    }

    #[test]
    fn token_comparison_requires_exact_match() {
        assert!(token_eq("secret", "secret"));
        assert!(!token_eq("secret", "secret2"));
        assert!(!token_eq("Secret", "secret"));
        assert!(!token_eq("", "secret"));
    }

    #[test]
    fn malformed_token_entries_fail_parsing() {
        assert!(parse_entries("no-colon-here", Role::Admin).is_err());
        assert!(parse_entries(":missing-label", Role::Admin).is_err());
        let parsed = parse_entries("dara:tok1, visal:tok2", Role::User).expect("parses");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].label, "visal");
    }
}
