use crate::cli::ServeArgs;
use crate::infra::{bootstrap_credentials, build_assistant, AppContext, AppState};
use crate::routes::build_app;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use sekolah::config::AppConfig;
use sekolah::error::AppError;
use sekolah::store::MemoryDocumentStore;
use sekolah::telemetry;
use sekolah::workflows::ppdb::SimulatedVerifier;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(MemoryDocumentStore::new());
    let credentials = bootstrap_credentials(&config.auth)?;
    let assistant = build_assistant(&config.assistant);
    let context = AppContext::new(
        store,
        Arc::new(SimulatedVerifier::new()),
        credentials,
        assistant,
    );

    let app = build_app(context)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "school back office ready");

    axum::serve(listener, app).await?;
    Ok(())
}
