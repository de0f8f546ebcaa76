use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::error;

use super::calendar::{build_year_calendar, NATIONAL_HOLIDAYS};
use super::models::{GalleryItem, NewsArticle, SchoolEvent, TeacherProfile, VideoItem};
use super::settings::{SettingKey, SettingsError, SiteSettings};
use super::{ContentCollection, ContentError, ContentRecord};
use crate::store::DocumentStore;

/// Shared handle for the content and settings endpoints.
#[derive(Debug)]
pub struct ContentState<S> {
    store: Arc<S>,
    settings: SiteSettings<S>,
}

impl<S: DocumentStore> ContentState<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            settings: SiteSettings::new(store.clone()),
            store,
        }
    }

    pub fn collection<T: ContentRecord>(&self) -> ContentCollection<T, S> {
        ContentCollection::new(self.store.clone())
    }

    pub fn settings(&self) -> &SiteSettings<S> {
        &self.settings
    }
}

type SharedState<S> = Arc<ContentState<S>>;

/// Administrator CRUD for every content collection plus the settings documents.
pub fn content_admin_router<S>(state: SharedState<S>) -> Router
where
    S: DocumentStore + 'static,
{
    let router = Router::new();
    let router = admin_collection::<NewsArticle, S>(router);
    let router = admin_collection::<TeacherProfile, S>(router);
    let router = admin_collection::<GalleryItem, S>(router);
    let router = admin_collection::<VideoItem, S>(router);
    let router = admin_collection::<SchoolEvent, S>(router);
    router
        .route(
            "/api/v1/admin/settings/:key",
            get(setting_handler::<S>).put(save_setting_handler::<S>),
        )
        .with_state(state)
}

/// Read-only endpoints backing the public website.
pub fn content_public_router<S>(state: SharedState<S>) -> Router
where
    S: DocumentStore + 'static,
{
    let router = Router::new();
    let router = public_collection::<NewsArticle, S>(router);
    let router = public_collection::<TeacherProfile, S>(router);
    let router = public_collection::<GalleryItem, S>(router);
    let router = public_collection::<VideoItem, S>(router);
    let router = public_collection::<SchoolEvent, S>(router);
    router
        .route("/api/v1/calendar/:year", get(calendar_handler::<S>))
        .route("/api/v1/settings/:key", get(setting_handler::<S>))
        .with_state(state)
}

fn admin_collection<T, S>(router: Router<SharedState<S>>) -> Router<SharedState<S>>
where
    T: ContentRecord,
    S: DocumentStore + 'static,
{
    let base = format!("/api/v1/admin/{}", T::COLLECTION.as_str());
    router
        .route(
            &base,
            get(list_handler::<T, S>).post(create_handler::<T, S>),
        )
        .route(
            &format!("{base}/:id"),
            get(get_handler::<T, S>)
                .put(update_handler::<T, S>)
                .delete(delete_handler::<T, S>),
        )
}

fn public_collection<T, S>(router: Router<SharedState<S>>) -> Router<SharedState<S>>
where
    T: ContentRecord,
    S: DocumentStore + 'static,
{
    let base = format!("/api/v1/{}", T::COLLECTION.as_str());
    router
        .route(&base, get(list_handler::<T, S>))
        .route(&format!("{base}/:id"), get(get_handler::<T, S>))
}

async fn list_handler<T, S>(State(state): State<SharedState<S>>) -> Response
where
    T: ContentRecord,
    S: DocumentStore + 'static,
{
    match state.collection::<T>().list() {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => content_error_response(err),
    }
}

async fn get_handler<T, S>(State(state): State<SharedState<S>>, Path(id): Path<String>) -> Response
where
    T: ContentRecord,
    S: DocumentStore + 'static,
{
    match state.collection::<T>().get(&id) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => content_error_response(err),
    }
}

async fn create_handler<T, S>(State(state): State<SharedState<S>>, Json(record): Json<T>) -> Response
where
    T: ContentRecord,
    S: DocumentStore + 'static,
{
    match state.collection::<T>().create(record) {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(err) => content_error_response(err),
    }
}

async fn update_handler<T, S>(
    State(state): State<SharedState<S>>,
    Path(id): Path<String>,
    Json(record): Json<T>,
) -> Response
where
    T: ContentRecord,
    S: DocumentStore + 'static,
{
    match state.collection::<T>().update(&id, record) {
        Ok(updated) => (StatusCode::OK, Json(updated)).into_response(),
        Err(err) => content_error_response(err),
    }
}

async fn delete_handler<T, S>(State(state): State<SharedState<S>>, Path(id): Path<String>) -> Response
where
    T: ContentRecord,
    S: DocumentStore + 'static,
{
    match state.collection::<T>().delete(&id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => content_error_response(err),
    }
}

async fn calendar_handler<S>(State(state): State<SharedState<S>>, Path(year): Path<i32>) -> Response
where
    S: DocumentStore + 'static,
{
    match state.collection::<SchoolEvent>().list() {
        Ok(events) => {
            let calendar = build_year_calendar(year, &events, &NATIONAL_HOLIDAYS);
            (StatusCode::OK, Json(calendar)).into_response()
        }
        Err(err) => content_error_response(err),
    }
}

async fn setting_handler<S>(State(state): State<SharedState<S>>, Path(key): Path<String>) -> Response
where
    S: DocumentStore + 'static,
{
    let Some(setting) = SettingKey::parse(&key) else {
        return unknown_setting(&key);
    };
    match state.settings().load_value(setting) {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(err) => settings_error_response(err),
    }
}

async fn save_setting_handler<S>(
    State(state): State<SharedState<S>>,
    Path(key): Path<String>,
    Json(payload): Json<Value>,
) -> Response
where
    S: DocumentStore + 'static,
{
    let Some(setting) = SettingKey::parse(&key) else {
        return unknown_setting(&key);
    };
    match state.settings().save_value(setting, payload) {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(err) => settings_error_response(err),
    }
}

fn unknown_setting(key: &str) -> Response {
    let payload = json!({ "error": "unknown setting", "key": key });
    (StatusCode::NOT_FOUND, Json(payload)).into_response()
}

fn content_error_response(err: ContentError) -> Response {
    match err {
        ContentError::Validation { field } => {
            let payload = json!({ "error": err.to_string(), "fields": [field] });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        ContentError::NotFound { collection, ref id } => {
            let payload = json!({ "error": "document not found", "collection": collection, "id": id });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        ContentError::Store(ref source) => {
            error!(error = %source, "content request failed");
            internal_error()
        }
    }
}

fn settings_error_response(err: SettingsError) -> Response {
    match err {
        SettingsError::InvalidPayload { key, ref source } => {
            let payload = json!({ "error": format!("invalid {key} payload: {source}"), "key": key });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        SettingsError::Store(ref source) => {
            error!(error = %source, "settings request failed");
            internal_error()
        }
    }
}

fn internal_error() -> Response {
    let payload = json!({ "error": "terjadi kesalahan, silakan coba lagi" });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}
