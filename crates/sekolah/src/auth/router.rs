use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use super::middleware::{auth_error_response, bearer_token, AuthState};
use super::{AuthError, Credentials};

pub fn auth_router(state: AuthState) -> Router {
    Router::new()
        .route("/api/v1/auth/login", post(login_handler))
        .route("/api/v1/auth/logout", post(logout_handler))
        .with_state(state)
}

async fn login_handler(State(auth): State<AuthState>, Json(credentials): Json<Credentials>) -> Response {
    match auth.authenticator.authenticate(&credentials) {
        Ok(principal) => {
            let session = auth.sessions.issue(principal);
            (StatusCode::OK, Json(session)).into_response()
        }
        Err(err) => auth_error_response(err),
    }
}

async fn logout_handler(State(auth): State<AuthState>, headers: HeaderMap) -> Response {
    let Some(token) = bearer_token(&headers) else {
        return auth_error_response(AuthError::MissingToken);
    };
    auth.sessions.revoke(token);
    StatusCode::NO_CONTENT.into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use axum::middleware::from_fn_with_state;
    use axum::routing::get;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::auth::{require_admin, require_parent, CredentialStore, Role, SessionStore};

    fn state() -> AuthState {
        let credentials = CredentialStore::new();
        credentials
            .register("admin", "rahasia-123", Role::Admin)
            .expect("register admin");
        credentials
            .register(
                "wali",
                "portal-456",
                Role::Parent {
                    student_id: "S-001".to_string(),
                },
            )
            .expect("register parent");
        AuthState::new(Arc::new(credentials), Arc::new(SessionStore::default()))
    }

    fn app(state: AuthState) -> Router {
        let admin = Router::new()
            .route("/admin/ping", get(|| async { "pong" }))
            .layer(from_fn_with_state(state.clone(), require_admin));
        let parent = Router::new()
            .route("/portal/ping", get(|| async { "pong" }))
            .layer(from_fn_with_state(state.clone(), require_parent));
        auth_router(state).merge(admin).merge(parent)
    }

    async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "username": username, "password": password }).to_string(),
            ))
            .expect("request builds");
        let response = app.clone().oneshot(request).await.expect("router responds");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&bytes).expect("json payload"))
    }

    fn with_token(method: Method, uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .expect("request builds")
    }

    #[tokio::test]
    async fn login_issues_token_that_unlocks_admin_routes() {
        let app = app(state());
        let (status, body) = login(&app, "admin", "rahasia-123").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["principal"]["role"], "admin");
        let token = body["token"].as_str().expect("token").to_string();

        let response = app
            .clone()
            .oneshot(with_token(Method::GET, "/admin/ping", &token))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(with_token(Method::GET, "/portal/ping", &token))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let app = app(state());
        let (status, body) = login(&app, "admin", "salah").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid username or password");
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let app = app(state());
        let request = Request::builder()
            .uri("/admin/ping")
            .body(Body::empty())
            .expect("request builds");
        let response = app.oneshot(request).await.expect("router responds");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn logout_revokes_the_session() {
        let app = app(state());
        let (_, body) = login(&app, "wali", "portal-456").await;
        let token = body["token"].as_str().expect("token").to_string();

        let response = app
            .clone()
            .oneshot(with_token(Method::GET, "/portal/ping", &token))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(with_token(Method::POST, "/api/v1/auth/logout", &token))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(with_token(Method::GET, "/portal/ping", &token))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
