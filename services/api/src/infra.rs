use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use tokio::sync::{Mutex, MutexGuard};

use apnea_screen::config::SinkConfig;
use apnea_screen::screening::{
    EmailNotificationSink, InMemorySessionStore, RecordStoreSink, ScreeningWizard,
    SheetsWebhookSink, SubmissionOrchestrator, SubmissionSink,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// One live wizard plus the orchestrator sharing its session store.
pub(crate) struct ScreeningSession {
    pub(crate) wizard: ScreeningWizard<InMemorySessionStore>,
    pub(crate) orchestrator: SubmissionOrchestrator<InMemorySessionStore>,
}

/// In-process registry of live screening sessions, keyed by an opaque id
/// handed to the client at creation time.
#[derive(Clone)]
pub(crate) struct SessionRegistry {
    sinks: Arc<Vec<Arc<dyn SubmissionSink>>>,
    entries: Arc<Mutex<HashMap<String, ScreeningSession>>>,
}

impl SessionRegistry {
    pub(crate) fn new(sinks: Vec<Arc<dyn SubmissionSink>>) -> Self {
        Self {
            sinks: Arc::new(sinks),
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Create a fresh session backed by its own in-memory store.
    pub(crate) async fn create(&self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let store = Arc::new(InMemorySessionStore::default());
        let mut wizard = ScreeningWizard::new(Arc::clone(&store));
        wizard.restore().await;
        let orchestrator = SubmissionOrchestrator::new(store, self.sinks.as_ref().clone());

        self.entries.lock().await.insert(
            id.clone(),
            ScreeningSession {
                wizard,
                orchestrator,
            },
        );
        id
    }

    pub(crate) async fn sessions(&self) -> MutexGuard<'_, HashMap<String, ScreeningSession>> {
        self.entries.lock().await
    }
}

/// Every configured sink is constructed up front; a sink missing its
/// credential fails at send time without blocking the others.
pub(crate) fn build_sinks(config: &SinkConfig) -> Vec<Arc<dyn SubmissionSink>> {
    let client = reqwest::Client::new();
    vec![
        Arc::new(SheetsWebhookSink::new(client.clone(), config.sheets.clone())),
        Arc::new(EmailNotificationSink::new(
            client.clone(),
            config.email.clone(),
        )),
        Arc::new(RecordStoreSink::new(client, config.record_store.clone())),
    ]
}
