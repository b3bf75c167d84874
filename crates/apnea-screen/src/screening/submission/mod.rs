mod http;
mod payload;
mod report;
mod sink;

pub use http::{EmailNotificationSink, RecordStoreSink, SheetsWebhookSink};
pub use payload::{ClientContext, PayloadError, PayloadMetadata, SubmissionPayload};
pub use report::render_report_html;
pub use sink::{SinkError, SinkReceipt, SubmissionSink};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use super::assessment::AssessmentEngine;
use super::domain::{QuestionId, SubmissionState, WizardSession};
use super::store::{DraftKey, SessionStore};

/// Default source tag stamped into payload metadata.
pub const SOURCE_TAG: &str = "stop-bang-screening";

/// Aggregate outcome surfaced to callers; individual sink errors stay
/// internal to the orchestrator's logs and the failure archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionOutcome {
    Submitted,
    Failed,
}

/// What a caller learns about a submission attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReport {
    pub outcome: SubmissionOutcome,
    pub session_id: String,
    pub delivered: usize,
    pub attempted: usize,
}

/// Caller errors. The orchestrator's precondition (idle session, complete
/// questionnaire) is the caller's responsibility, not defended against.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("submission already {0}")]
    NotIdle(&'static str),
    #[error("questionnaire incomplete: {answered} of {required} answers recorded")]
    IncompleteQuestionnaire { answered: usize, required: usize },
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

/// Reason one sink rejected the payload, as archived for operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkFailure {
    pub sink: String,
    pub reason: String,
}

/// Written to the local store when every sink fails, so an operator can
/// replay the payload manually. Never retried automatically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedSubmissionRecord {
    pub payload: SubmissionPayload,
    pub failures: Vec<SinkFailure>,
    pub archived_at: DateTime<Utc>,
}

/// Fans one payload out to every configured sink and decides the aggregate
/// outcome once all of them settle.
pub struct SubmissionOrchestrator<S> {
    store: Arc<S>,
    sinks: Vec<Arc<dyn SubmissionSink>>,
    engine: AssessmentEngine,
    source_tag: String,
}

impl<S: SessionStore + 'static> SubmissionOrchestrator<S> {
    pub fn new(store: Arc<S>, sinks: Vec<Arc<dyn SubmissionSink>>) -> Self {
        Self {
            store,
            sinks,
            engine: AssessmentEngine::new(),
            source_tag: SOURCE_TAG.to_string(),
        }
    }

    pub fn with_source_tag(mut self, source_tag: impl Into<String>) -> Self {
        self.source_tag = source_tag.into();
        self
    }

    /// Deliver the completed session to every sink concurrently.
    ///
    /// The working draft is discarded the moment dispatch is initiated, not
    /// once delivery settles. The decision waits for all sinks (a join, not a
    /// race): at least one success reads as submitted; a total failure
    /// archives the payload locally for manual recovery.
    pub async fn submit(
        &self,
        session: &mut WizardSession,
        client: ClientContext,
    ) -> Result<SubmissionReport, SubmitError> {
        match session.submission_state {
            SubmissionState::Idle => {}
            other => return Err(SubmitError::NotIdle(other.label())),
        }
        if !session.answers.is_complete() {
            return Err(SubmitError::IncompleteQuestionnaire {
                answered: session.answers.answered(),
                required: QuestionId::ALL.len(),
            });
        }

        session.submission_state = SubmissionState::Submitting;

        let assessment = self.engine.assess(&session.profile, &session.answers);
        let metadata = PayloadMetadata {
            submitted_at: Utc::now(),
            session_id: Uuid::new_v4().to_string(),
            source_tag: self.source_tag.clone(),
            client,
        };
        let payload =
            SubmissionPayload::assemble(&session.profile, &session.answers, &assessment, metadata)?;
        let session_id = payload.metadata.session_id.clone();

        // Spawned so each sink runs in its own failure domain: a panic or
        // error in one can never abort the others.
        let handles: Vec<_> = self
            .sinks
            .iter()
            .map(|sink| {
                let name = sink.name();
                let sink = Arc::clone(sink);
                let payload = payload.clone();
                (name, tokio::spawn(async move { sink.send(&payload).await }))
            })
            .collect();

        self.discard_drafts().await;

        let settled = join_all(handles.into_iter().map(|(name, handle)| async move {
            match handle.await {
                Ok(result) => (name, result),
                Err(join_err) => (
                    name,
                    Err(SinkError::Transport(format!("sink task aborted: {join_err}"))),
                ),
            }
        }))
        .await;

        let attempted = settled.len();
        let mut delivered = 0usize;
        let mut failures = Vec::new();
        for (name, result) in settled {
            match result {
                Ok(receipt) => {
                    debug!(sink = name, reference = ?receipt.reference, "sink delivery confirmed");
                    delivered += 1;
                }
                Err(err) => {
                    warn!(sink = name, error = %err, "sink delivery failed");
                    failures.push(SinkFailure {
                        sink: name.to_string(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        if delivered > 0 {
            session.submission_state = SubmissionState::Submitted;
            Ok(SubmissionReport {
                outcome: SubmissionOutcome::Submitted,
                session_id,
                delivered,
                attempted,
            })
        } else {
            session.submission_state = SubmissionState::Failed;
            self.archive_failure(payload, failures).await;
            Ok(SubmissionReport {
                outcome: SubmissionOutcome::Failed,
                session_id,
                delivered: 0,
                attempted,
            })
        }
    }

    async fn discard_drafts(&self) {
        for key in DraftKey::DRAFTS {
            if let Err(err) = self.store.clear(key).await {
                debug!(key = key.name(), error = %err, "draft clear skipped");
            }
        }
    }

    async fn archive_failure(&self, payload: SubmissionPayload, failures: Vec<SinkFailure>) {
        let record = FailedSubmissionRecord {
            payload,
            failures,
            archived_at: Utc::now(),
        };
        match serde_json::to_value(&record) {
            Ok(value) => {
                if let Err(err) = self.store.save(DraftKey::FailedSubmission, &value).await {
                    warn!(error = %err, "failed submission could not be archived");
                }
            }
            Err(err) => warn!(error = %err, "failed submission could not be serialized"),
        }
    }
}
