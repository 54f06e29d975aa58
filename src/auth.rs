//! Bearer-token identity resolution.
//!
//! The mock resolver gates on credential *presence*, not contents: any
//! well-formed `Authorization: Bearer <token>` header resolves to the
//! fixed mock identity. A real resolver would verify a signed token and
//! derive the identity from its claims — only this trait implementation
//! changes for that, not the handlers.

use crate::error::ApiError;
use crate::models::{LoginRequest, LoginResponse, MockUser};
use crate::store::TaskStore;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

pub const NO_TOKEN: &str = "Unauthorized: No token provided";
pub const INVALID_TOKEN: &str = "Unauthorized: Invalid token";

const MOCK_CALLER_ID: &str = "user-id-mock-123";

/// The owner principal every task operation is scoped by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerId(pub String);

pub trait IdentityResolver: Send + Sync {
    /// Resolve a caller identity from the raw `Authorization` header value.
    fn resolve(&self, header: Option<&str>) -> Result<CallerId, ApiError>;
}

/// Accepts any non-empty credential and yields the fixed mock identity.
pub struct MockIdentityResolver;

impl IdentityResolver for MockIdentityResolver {
    fn resolve(&self, header: Option<&str>) -> Result<CallerId, ApiError> {
        let header = header.ok_or(ApiError::Unauthenticated(NO_TOKEN))?;

        // Scheme/credential split. "Bearer" with nothing after it is a
        // present-but-malformed credential, reported distinctly.
        match header.split(' ').nth(1) {
            Some(token) if !token.is_empty() => Ok(CallerId(MOCK_CALLER_ID.to_string())),
            _ => Err(ApiError::Unauthenticated(INVALID_TOKEN)),
        }
    }
}

// ── Shared state ───────────────────────────────────────────────

pub struct AppState {
    pub store: TaskStore,
    pub resolver: Arc<dyn IdentityResolver>,
}

pub type SharedState = Arc<AppState>;

// ── Middleware ─────────────────────────────────────────────────

/// Resolve the caller before any task handler runs and stash the
/// identity in request extensions for `Extension<CallerId>` extractors.
pub async fn auth_middleware(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let caller = state.resolver.resolve(header)?;
    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}

// ── Mock login ─────────────────────────────────────────────────

/// Issue a throwaway token. No credentials are verified — the token's
/// only job is to be non-empty so the resolver above accepts it.
pub async fn login(Json(payload): Json<LoginRequest>) -> Result<Json<LoginResponse>, ApiError> {
    let email = payload.email.unwrap_or_default();
    let password = payload.password.unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest("Email and password are required"));
    }

    let name = email.split('@').next().unwrap_or_default().to_string();
    tracing::info!(user = %name, "mock login");

    Ok(Json(LoginResponse {
        message: "Login Successful",
        token: Uuid::new_v4().simple().to_string(),
        user: MockUser {
            id: Uuid::new_v4().simple().to_string(),
            name,
            email,
        },
    }))
}

// ── Tests ──────────────────────────────────────────────────────
