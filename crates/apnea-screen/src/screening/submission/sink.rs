use async_trait::async_trait;

use super::payload::SubmissionPayload;

/// Acknowledgement returned by a sink on successful delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkReceipt {
    pub sink: &'static str,
    pub reference: Option<String>,
}

/// Per-sink failure taxonomy. Captured and aggregated by the orchestrator,
/// logged for operators, never shown to the subject, never retried.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("sink configuration missing: {0}")]
    Config(&'static str),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unparsable response: {0}")]
    Malformed(String),
}

/// One opaque network call per external service. No retries, no circuit
/// breaking, no payload transformation beyond field renaming.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    fn name(&self) -> &'static str;
    async fn send(&self, payload: &SubmissionPayload) -> Result<SinkReceipt, SinkError>;
}
