use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use super::{draft_news_article, summarize_with_assistant, AssistantError, TextAssistant};
use crate::store::DocumentStore;
use crate::workflows::ppdb::{ApplicantRepository, StatusSummary};

/// Assistant backend plus the applicant roster it narrates.
pub struct AssistantState<S> {
    assistant: Arc<dyn TextAssistant>,
    applicants: ApplicantRepository<S>,
}

impl<S: DocumentStore> AssistantState<S> {
    pub fn new(assistant: Arc<dyn TextAssistant>, store: Arc<S>) -> Self {
        Self {
            assistant,
            applicants: ApplicantRepository::new(store),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    pub topic: String,
}

/// Administrator endpoints backed by the text assistant.
pub fn assistant_router<S>(state: Arc<AssistantState<S>>) -> Router
where
    S: DocumentStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/admin/assistant/news-draft",
            post(news_draft_handler::<S>),
        )
        .route(
            "/api/v1/admin/assistant/ppdb-summary",
            post(ppdb_summary_handler::<S>),
        )
        .with_state(state)
}

async fn news_draft_handler<S>(
    State(state): State<Arc<AssistantState<S>>>,
    Json(request): Json<DraftRequest>,
) -> Response
where
    S: DocumentStore + 'static,
{
    let assistant = state.assistant.clone();
    let outcome =
        tokio::task::spawn_blocking(move || draft_news_article(assistant.as_ref(), &request.topic))
            .await;

    match outcome {
        Ok(Ok(draft)) => {
            info!(title = %draft.title, "news draft generated");
            (StatusCode::OK, Json(draft)).into_response()
        }
        Ok(Err(err)) => assistant_error_response(err),
        Err(join) => {
            error!(error = %join, "news draft task failed");
            internal_error()
        }
    }
}

async fn ppdb_summary_handler<S>(State(state): State<Arc<AssistantState<S>>>) -> Response
where
    S: DocumentStore + 'static,
{
    let roster = match state.applicants.roster() {
        Ok(roster) => roster,
        Err(err) => {
            error!(error = %err, "failed to load roster for narrative");
            return internal_error();
        }
    };
    let summary = StatusSummary::from_roster(&roster);
    let assistant = state.assistant.clone();
    let prompt_summary = summary.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        summarize_with_assistant(assistant.as_ref(), &prompt_summary)
    })
    .await;

    match outcome {
        Ok(Ok(narrative)) => {
            (StatusCode::OK, Json(json!({ "summary": summary, "narrative": narrative })))
                .into_response()
        }
        Ok(Err(err)) => assistant_error_response(err),
        Err(join) => {
            error!(error = %join, "summary task failed");
            internal_error()
        }
    }
}

fn assistant_error_response(err: AssistantError) -> Response {
    let status = match err {
        AssistantError::EmptyPrompt => StatusCode::UNPROCESSABLE_ENTITY,
        AssistantError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        AssistantError::Transport(_)
        | AssistantError::Status(_)
        | AssistantError::InvalidPayload(_) => {
            error!(error = %err, "assistant call failed");
            StatusCode::BAD_GATEWAY
        }
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

fn internal_error() -> Response {
    let payload = json!({ "error": "terjadi kesalahan, silakan coba lagi" });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}
