use apartment_ai::appraisal::{AppraisalState, InMemorySessionStore};
use apartment_ai::pitch::CompletionClient;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Appraisal state as wired in production: live completion client, in-process sessions.
pub(crate) type ServiceState = AppraisalState<CompletionClient, InMemorySessionStore>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}
