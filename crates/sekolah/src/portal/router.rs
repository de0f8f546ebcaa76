use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use serde_json::json;
use tracing::error;

use super::ParentPortal;
use crate::auth::Principal;
use crate::store::DocumentStore;

/// Portal endpoints. Expects a [`Principal`] extension from the parent guard.
pub fn portal_router<S>(portal: Arc<ParentPortal<S>>) -> Router
where
    S: DocumentStore + 'static,
{
    Router::new()
        .route("/api/v1/portal/overview", get(overview_handler::<S>))
        .with_state(portal)
}

async fn overview_handler<S>(
    State(portal): State<Arc<ParentPortal<S>>>,
    principal: Option<Extension<Principal>>,
) -> Response
where
    S: DocumentStore + 'static,
{
    let Some(student_id) = principal
        .as_ref()
        .and_then(|Extension(principal)| principal.student_id())
    else {
        let payload = json!({ "error": "insufficient permissions" });
        return (StatusCode::FORBIDDEN, Json(payload)).into_response();
    };

    match portal.overview(student_id) {
        Ok(overview) => (StatusCode::OK, Json(overview)).into_response(),
        Err(err) => {
            error!(error = %err, student_id, "portal overview failed");
            let payload = json!({ "error": "terjadi kesalahan, silakan coba lagi" });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
