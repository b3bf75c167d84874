//! Sleep-apnea screening workflow: wizard session state, deterministic risk
//! assessment, and submission fan-out to the configured sinks.

pub mod assessment;
pub mod debounce;
pub mod domain;
pub mod store;
pub mod submission;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use assessment::{
    AssessmentEngine, AssessmentResult, BmiCategory, Priority, RiskIndicator, RiskLevel,
    ScoreComponent,
};
pub use debounce::{
    DebouncedPersister, PersistJob, PersistScheduler, ScheduledPersist, TokioPersistScheduler,
};
pub use domain::{
    Answer, AnswerSet, QuestionId, Sex, SubjectProfile, SubmissionState, WizardSession, WizardStep,
};
pub use store::{DraftKey, InMemorySessionStore, SessionStore, StoreError};
pub use submission::{
    ClientContext, EmailNotificationSink, FailedSubmissionRecord, PayloadError, PayloadMetadata,
    RecordStoreSink, SheetsWebhookSink, SinkError, SinkFailure, SinkReceipt,
    SubmissionOrchestrator, SubmissionOutcome, SubmissionPayload, SubmissionReport,
    SubmissionSink, SubmitError,
};
pub use wizard::ScreeningWizard;
