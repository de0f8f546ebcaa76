use crate::infra::{AppContext, AppState};
use axum::http::{header, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use sekolah::assistant::assistant_router;
use sekolah::auth::{auth_router, require_admin, require_parent};
use sekolah::content::{content_admin_router, content_public_router};
use sekolah::portal::portal_router;
use sekolah::store::DocumentStore;
use sekolah::workflows::ppdb::{ppdb_admin_router, ppdb_public_router, DocumentVerifier};
use serde_json::json;

/// Public pages, the login endpoints, the guarded administrator and parent surfaces, and the
/// operational endpoints.
pub(crate) fn build_app<S, V>(context: AppContext<S, V>) -> Router
where
    S: DocumentStore + 'static,
    V: DocumentVerifier + 'static,
{
    let AppContext {
        ppdb,
        content,
        portal,
        assistant,
        auth,
    } = context;

    let admin = ppdb_admin_router(ppdb.clone())
        .merge(content_admin_router(content.clone()))
        .merge(assistant_router(assistant))
        .layer(from_fn_with_state(auth.clone(), require_admin));

    let parent = portal_router(portal).layer(from_fn_with_state(auth.clone(), require_parent));

    Router::new()
        .merge(ppdb_public_router(ppdb))
        .merge(content_public_router(content))
        .merge(auth_router(auth))
        .merge(admin)
        .merge(parent)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
