use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::domain::{
    AdmissionStatus, AiVerificationStatus, Applicant, ApplicantId, ApplicantSubmission,
};
use super::roster::{RosterQuery, Selection, SortDirection, SortDirective, SortField, StatusFilter};
use super::service::{PpdbAdminService, PpdbServiceError};
use super::verification::DocumentVerifier;
use crate::store::DocumentStore;

/// Public admission form endpoints.
pub fn ppdb_public_router<S, V>(service: Arc<PpdbAdminService<S, V>>) -> Router
where
    S: DocumentStore + 'static,
    V: DocumentVerifier + 'static,
{
    Router::new()
        .route("/api/v1/ppdb/applications", post(submit_handler::<S, V>))
        .route("/api/v1/ppdb/schedule", get(schedule_handler::<S, V>))
        .with_state(service)
}

/// Administrator roster endpoints. Callers are expected to layer authentication on top.
pub fn ppdb_admin_router<S, V>(service: Arc<PpdbAdminService<S, V>>) -> Router
where
    S: DocumentStore + 'static,
    V: DocumentVerifier + 'static,
{
    Router::new()
        .route("/api/v1/admin/ppdb/applicants", get(roster_handler::<S, V>))
        .route(
            "/api/v1/admin/ppdb/applicants/:id",
            get(applicant_handler::<S, V>).delete(delete_handler::<S, V>),
        )
        .route(
            "/api/v1/admin/ppdb/applicants/:id/status",
            put(status_handler::<S, V>),
        )
        .route(
            "/api/v1/admin/ppdb/applicants/:id/verify",
            post(verify_handler::<S, V>),
        )
        .route("/api/v1/admin/ppdb/summary", get(summary_handler::<S, V>))
        .route(
            "/api/v1/admin/ppdb/bulk/status",
            post(bulk_status_handler::<S, V>),
        )
        .route(
            "/api/v1/admin/ppdb/bulk/ai-verify",
            post(bulk_ai_verify_handler::<S, V>),
        )
        .route(
            "/api/v1/admin/ppdb/bulk/delete",
            post(bulk_delete_handler::<S, V>),
        )
        .route(
            "/api/v1/admin/ppdb/bulk/export",
            post(bulk_export_handler::<S, V>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub struct RosterParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<StatusFilter>,
    #[serde(default)]
    pub sort: Option<SortField>,
    #[serde(default)]
    pub direction: Option<SortDirection>,
}

impl From<RosterParams> for RosterQuery {
    fn from(params: RosterParams) -> Self {
        RosterQuery {
            search: params.search.unwrap_or_default(),
            status: params.status.unwrap_or_default(),
            sort: SortDirective {
                field: params.sort.unwrap_or_default(),
                direction: params.direction.unwrap_or_default(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RosterResponse {
    pub total: usize,
    pub visible: usize,
    pub applicants: Vec<Applicant>,
}

/// Receipt returned to the family after a successful submission.
#[derive(Debug, Serialize)]
pub struct SubmissionReceipt {
    pub id: ApplicantId,
    pub registration_number: String,
    pub full_name: String,
    pub submitted_on: NaiveDate,
    pub status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: AdmissionStatus,
}

#[derive(Debug, Deserialize)]
pub struct BulkRequest {
    pub ids: Vec<ApplicantId>,
}

#[derive(Debug, Deserialize)]
pub struct BulkStatusRequest {
    pub ids: Vec<ApplicantId>,
    pub status: AdmissionStatus,
}

#[derive(Debug, Serialize)]
pub struct VerificationResponse {
    pub id: ApplicantId,
    pub ai_status: AiVerificationStatus,
    pub label: &'static str,
}

pub(crate) async fn submit_handler<S, V>(
    State(service): State<Arc<PpdbAdminService<S, V>>>,
    Json(submission): Json<ApplicantSubmission>,
) -> Response
where
    S: DocumentStore + 'static,
    V: DocumentVerifier + 'static,
{
    let today = Local::now().date_naive();
    match service.submit(submission, today) {
        Ok(applicant) => {
            let receipt = SubmissionReceipt {
                id: applicant.id,
                registration_number: applicant.registration_number,
                full_name: applicant.full_name,
                submitted_on: applicant.submitted_on,
                status: applicant.status.label(),
            };
            (StatusCode::CREATED, Json(receipt)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn schedule_handler<S, V>(
    State(service): State<Arc<PpdbAdminService<S, V>>>,
) -> Response
where
    S: DocumentStore + 'static,
    V: DocumentVerifier + 'static,
{
    match service.schedule() {
        Ok(schedule) => {
            let open = schedule.is_open(Local::now().date_naive());
            (
                StatusCode::OK,
                Json(json!({ "schedule": schedule, "open": open })),
            )
                .into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn roster_handler<S, V>(
    State(service): State<Arc<PpdbAdminService<S, V>>>,
    Query(params): Query<RosterParams>,
) -> Response
where
    S: DocumentStore + 'static,
    V: DocumentVerifier + 'static,
{
    let query = RosterQuery::from(params);
    let roster = match service.roster() {
        Ok(roster) => roster,
        Err(err) => return error_response(err),
    };
    let applicants: Vec<Applicant> = query.view(&roster).into_iter().cloned().collect();
    let body = RosterResponse {
        total: roster.len(),
        visible: applicants.len(),
        applicants,
    };
    (StatusCode::OK, Json(body)).into_response()
}

pub(crate) async fn applicant_handler<S, V>(
    State(service): State<Arc<PpdbAdminService<S, V>>>,
    Path(id): Path<String>,
) -> Response
where
    S: DocumentStore + 'static,
    V: DocumentVerifier + 'static,
{
    match service.get(&ApplicantId(id)) {
        Ok(applicant) => (StatusCode::OK, Json(applicant)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn status_handler<S, V>(
    State(service): State<Arc<PpdbAdminService<S, V>>>,
    Path(id): Path<String>,
    Json(change): Json<StatusChange>,
) -> Response
where
    S: DocumentStore + 'static,
    V: DocumentVerifier + 'static,
{
    match service.set_status(&ApplicantId(id), change.status) {
        Ok(applicant) => (StatusCode::OK, Json(applicant)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_handler<S, V>(
    State(service): State<Arc<PpdbAdminService<S, V>>>,
    Path(id): Path<String>,
) -> Response
where
    S: DocumentStore + 'static,
    V: DocumentVerifier + 'static,
{
    let mut selection = Selection::new();
    match service.delete(&ApplicantId(id), &mut selection) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn verify_handler<S, V>(
    State(service): State<Arc<PpdbAdminService<S, V>>>,
    Path(id): Path<String>,
) -> Response
where
    S: DocumentStore + 'static,
    V: DocumentVerifier + 'static,
{
    let id = ApplicantId(id);
    match service.verify(&id) {
        Ok(ai_status) => (
            StatusCode::OK,
            Json(VerificationResponse {
                id,
                ai_status,
                label: ai_status.label(),
            }),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn summary_handler<S, V>(
    State(service): State<Arc<PpdbAdminService<S, V>>>,
) -> Response
where
    S: DocumentStore + 'static,
    V: DocumentVerifier + 'static,
{
    match service.summary() {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn bulk_status_handler<S, V>(
    State(service): State<Arc<PpdbAdminService<S, V>>>,
    Json(request): Json<BulkStatusRequest>,
) -> Response
where
    S: DocumentStore + 'static,
    V: DocumentVerifier + 'static,
{
    let mut selection: Selection = request.ids.into_iter().collect();
    match service.bulk_set_status(&mut selection, request.status) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn bulk_ai_verify_handler<S, V>(
    State(service): State<Arc<PpdbAdminService<S, V>>>,
    Json(request): Json<BulkRequest>,
) -> Response
where
    S: DocumentStore + 'static,
    V: DocumentVerifier + 'static,
{
    let mut selection: Selection = request.ids.into_iter().collect();
    match service.bulk_set_ai_verified(&mut selection) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn bulk_delete_handler<S, V>(
    State(service): State<Arc<PpdbAdminService<S, V>>>,
    Json(request): Json<BulkRequest>,
) -> Response
where
    S: DocumentStore + 'static,
    V: DocumentVerifier + 'static,
{
    let mut selection: Selection = request.ids.into_iter().collect();
    match service.bulk_delete(&mut selection) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn bulk_export_handler<S, V>(
    State(service): State<Arc<PpdbAdminService<S, V>>>,
    Json(request): Json<BulkRequest>,
) -> Response
where
    S: DocumentStore + 'static,
    V: DocumentVerifier + 'static,
{
    let selection: Selection = request.ids.into_iter().collect();
    match service.export_csv(&selection) {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, mime::TEXT_CSV_UTF_8.as_ref()),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"data-pendaftar-ppdb.csv\"",
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: PpdbServiceError) -> Response {
    match err {
        PpdbServiceError::Validation(validation) => {
            let fields: Vec<&'static str> = validation
                .violations
                .iter()
                .map(|violation| violation.field())
                .collect();
            let payload = json!({
                "error": validation.to_string(),
                "fields": fields,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        PpdbServiceError::AdmissionsClosed => {
            let payload = json!({ "error": "pendaftaran PPDB sedang ditutup" });
            (StatusCode::FORBIDDEN, Json(payload)).into_response()
        }
        PpdbServiceError::NotFound(id) => {
            let payload = json!({
                "error": "applicant not found",
                "id": id,
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        other => {
            error!(error = %other, "ppdb request failed");
            let payload = json!({ "error": "terjadi kesalahan, silakan coba lagi" });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
