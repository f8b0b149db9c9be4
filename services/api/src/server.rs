use crate::cli::ServeArgs;
use crate::infra::{AppState, ServiceState};
use crate::routes::with_appraisal_routes;
use apartment_ai::appraisal::{AppraisalService, InMemorySessionStore};
use apartment_ai::config::AppConfig;
use apartment_ai::error::AppError;
use apartment_ai::pitch::CompletionClient;
use apartment_ai::telemetry;
use apartment_ai::valuation::ModelStore;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::path::{Path, PathBuf};
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
    if let Some(model_dir) = args.model_dir.take() {
        config.artifacts.model_dir = model_dir;
    }

    telemetry::init(&config.telemetry)?;

    let store = ModelStore::load(&config.artifacts.model_dir)?;
    let pitch = Arc::new(CompletionClient::new(config.pitch.clone())?);
    let chart_path = config.artifacts.chart_path.clone();
    let service = AppraisalService::new(&store, pitch)
        .with_finance(config.finance)
        .with_chart_path(chart_path.clone());
    let state: Arc<ServiceState> = Arc::new(ServiceState::new(
        service,
        Arc::new(InMemorySessionStore::default()),
    ));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_appraisal_routes(state, &static_dir(&chart_path))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        pitch_enabled = config.pitch.enabled,
        "apartment appraisal service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// The chart's parent directory is what `/static` serves.
fn static_dir(chart_path: &Path) -> PathBuf {
    chart_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
