use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use sekolah::assistant::{
    AssistantState, HttpAssistant, TextAssistant, UnconfiguredAssistant,
};
use sekolah::auth::{AuthState, CredentialStore, Role, SessionStore};
use sekolah::config::{AssistantConfig, AuthConfig};
use sekolah::content::ContentState;
use sekolah::error::AppError;
use sekolah::portal::ParentPortal;
use sekolah::store::DocumentStore;
use sekolah::workflows::ppdb::{Applicant, DocumentVerifier, PpdbAdminService};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Every service the HTTP surface needs, built once at startup over a shared store.
pub(crate) struct AppContext<S, V> {
    pub(crate) ppdb: Arc<PpdbAdminService<S, V>>,
    pub(crate) content: Arc<ContentState<S>>,
    pub(crate) portal: Arc<ParentPortal<S>>,
    pub(crate) assistant: Arc<AssistantState<S>>,
    pub(crate) auth: AuthState,
}

impl<S, V> AppContext<S, V>
where
    S: DocumentStore + 'static,
    V: DocumentVerifier + 'static,
{
    pub(crate) fn new(
        store: Arc<S>,
        verifier: Arc<V>,
        credentials: CredentialStore,
        assistant: Arc<dyn TextAssistant>,
    ) -> Self {
        Self {
            ppdb: Arc::new(PpdbAdminService::new(store.clone(), verifier)),
            content: Arc::new(ContentState::new(store.clone())),
            portal: Arc::new(ParentPortal::new(store.clone())),
            assistant: Arc::new(AssistantState::new(assistant, store)),
            auth: AuthState::new(Arc::new(credentials), Arc::new(SessionStore::default())),
        }
    }
}

/// Registers the configured bootstrap accounts.
pub(crate) fn bootstrap_credentials(config: &AuthConfig) -> Result<CredentialStore, AppError> {
    let credentials = CredentialStore::new();

    match &config.admin_password {
        Some(password) => {
            credentials.register(&config.admin_username, password, Role::Admin)?;
            info!(username = %config.admin_username, "administrator account registered");
        }
        None => warn!("ADMIN_PASSWORD not set; administrator routes are unreachable"),
    }

    if let Some(parent) = &config.parent {
        credentials.register(
            &parent.username,
            &parent.password,
            Role::Parent {
                student_id: parent.student_id.clone(),
            },
        )?;
        info!(username = %parent.username, student_id = %parent.student_id, "parent account registered");
    }

    Ok(credentials)
}

pub(crate) fn build_assistant(config: &AssistantConfig) -> Arc<dyn TextAssistant> {
    match &config.endpoint {
        Some(endpoint) => {
            info!(%endpoint, "assistant endpoint configured");
            Arc::new(HttpAssistant::new(endpoint.clone(), config.api_key.clone()))
        }
        None => {
            warn!("ASSISTANT_ENDPOINT not set; assistant routes will answer 503");
            Arc::new(UnconfiguredAssistant)
        }
    }
}

/// Reads a JSON array of applicants, as returned by the roster endpoint.
pub(crate) fn load_roster(path: &Path) -> Result<Vec<Applicant>, AppError> {
    let raw = std::fs::read(path)?;
    Ok(serde_json::from_slice(&raw)?)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
