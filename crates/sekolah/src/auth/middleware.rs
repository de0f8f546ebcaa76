use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use super::{AuthError, Authenticator, Principal, SessionStore};

/// Credential checker and session table shared by the login routes and the role guards.
#[derive(Clone)]
pub struct AuthState {
    pub authenticator: Arc<dyn Authenticator>,
    pub sessions: Arc<SessionStore>,
}

impl AuthState {
    pub fn new(authenticator: Arc<dyn Authenticator>, sessions: Arc<SessionStore>) -> Self {
        Self {
            authenticator,
            sessions,
        }
    }

    /// Principal for the bearer token in `headers`.
    pub fn principal(&self, headers: &HeaderMap) -> Result<Principal, AuthError> {
        let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;
        self.sessions.resolve(token)
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Lets the request through only for administrators and attaches the [`Principal`].
pub async fn require_admin(State(auth): State<AuthState>, request: Request, next: Next) -> Response {
    guard(&auth, request, next, Principal::is_admin).await
}

/// Lets the request through only for parent accounts and attaches the [`Principal`].
pub async fn require_parent(
    State(auth): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    guard(&auth, request, next, |principal| principal.student_id().is_some()).await
}

async fn guard<F>(auth: &AuthState, mut request: Request, next: Next, allowed: F) -> Response
where
    F: Fn(&Principal) -> bool,
{
    let principal = match auth.principal(request.headers()) {
        Ok(principal) => principal,
        Err(err) => return auth_error_response(err),
    };
    if !allowed(&principal) {
        warn!(
            username = %principal.username,
            path = %request.uri().path(),
            "request rejected: role not permitted"
        );
        return auth_error_response(AuthError::Forbidden);
    }
    request.extensions_mut().insert(principal);
    next.run(request).await
}

pub fn auth_error_response(err: AuthError) -> Response {
    let status = match err {
        AuthError::InvalidCredentials | AuthError::MissingToken | AuthError::InvalidToken => {
            StatusCode::UNAUTHORIZED
        }
        AuthError::Forbidden => StatusCode::FORBIDDEN,
        AuthError::Hash(ref reason) => {
            error!(reason = %reason, "credential check failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
