use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use super::assessment::{AssessmentEngine, AssessmentResult};
use super::debounce::{DebouncedPersister, PersistScheduler, TokioPersistScheduler};
use super::domain::{
    Answer, AnswerSet, QuestionId, SubjectProfile, SubmissionState, WizardSession, WizardStep,
};
use super::store::{DraftKey, SessionStore};
use super::submission::{ClientContext, SubmissionOrchestrator, SubmissionReport, SubmitError};

/// Quiet period between the last field edit and the draft write.
pub const DEBOUNCE_QUIET_PERIOD: Duration = Duration::from_secs(1);

/// The four-step intake wizard: owns the session, enforces step gating, and
/// drives draft persistence through the injected store.
///
/// Gating is advisory: a rejected transition or edit is a plain `false`, the
/// caller re-prompts, nothing is logged as an error.
pub struct ScreeningWizard<S> {
    session: WizardSession,
    store: Arc<S>,
    persister: DebouncedPersister,
    engine: AssessmentEngine,
}

impl<S: SessionStore + 'static> ScreeningWizard<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_scheduler(store, Arc::new(TokioPersistScheduler), DEBOUNCE_QUIET_PERIOD)
    }

    pub fn with_scheduler(
        store: Arc<S>,
        scheduler: Arc<dyn PersistScheduler>,
        quiet_period: Duration,
    ) -> Self {
        Self {
            session: WizardSession::default(),
            store,
            persister: DebouncedPersister::new(scheduler, quiet_period),
            engine: AssessmentEngine::new(),
        }
    }

    pub fn session(&self) -> &WizardSession {
        &self.session
    }

    pub fn current_step(&self) -> WizardStep {
        self.session.current_step
    }

    /// Best-effort restore of a prior incomplete session. A loaded draft only
    /// overwrites an aggregate still at its empty default; missing or
    /// unreadable drafts are silently ignored.
    pub async fn restore(&mut self) {
        if self.session.profile.is_untouched() {
            if let Some(profile) = self.load_draft::<SubjectProfile>(DraftKey::Profile).await {
                self.session.profile = profile;
            }
        }
        if self.session.answers.is_empty() {
            if let Some(answers) = self.load_draft::<AnswerSet>(DraftKey::Answers).await {
                self.session.answers = answers;
            }
        }
        if let Some(number) = self.load_draft::<u8>(DraftKey::Step).await {
            if let Some(step) = WizardStep::from_number(number) {
                self.session.current_step = step;
            }
        }
    }

    /// Apply a profile edit and queue a debounced draft write. Rejected once
    /// submission has begun: the profile is immutable from that point.
    pub fn update_profile(&mut self, edit: impl FnOnce(&mut SubjectProfile)) -> bool {
        if self.session.submission_state != SubmissionState::Idle {
            return false;
        }
        edit(&mut self.session.profile);
        self.queue_aggregate(DraftKey::Profile, &self.session.profile);
        true
    }

    /// Record one questionnaire answer and queue a debounced draft write.
    pub fn record_answer(&mut self, question: QuestionId, answer: Answer) -> bool {
        if self.session.submission_state != SubmissionState::Idle {
            return false;
        }
        self.session.answers.record(question, answer);
        self.queue_aggregate(DraftKey::Answers, &self.session.answers);
        true
    }

    /// Advance when the current step's completeness predicate holds. A
    /// rejected transition is a no-op, not an error.
    pub async fn next(&mut self) -> bool {
        if !self.step_complete(self.session.current_step) {
            return false;
        }
        let Some(step) = self.session.current_step.forward() else {
            return false;
        };
        self.session.current_step = step;
        self.persist_step().await;
        true
    }

    /// Step back; always succeeds from steps 2-4 and clears nothing.
    pub async fn prev(&mut self) -> bool {
        let Some(step) = self.session.current_step.back() else {
            return false;
        };
        self.session.current_step = step;
        self.persist_step().await;
        true
    }

    /// Whether the current step's completeness predicate holds right now.
    pub fn can_proceed(&self) -> bool {
        self.step_complete(self.session.current_step)
    }

    /// Computed lazily and purely on read; entering the results step triggers
    /// neither scoring nor submission.
    pub fn assessment(&self) -> AssessmentResult {
        self.engine
            .assess(&self.session.profile, &self.session.answers)
    }

    /// Reset to an empty session, drop pending draft writes, and clear every
    /// persisted draft key. Available in every submission state.
    pub async fn restart(&mut self) {
        self.persister.cancel_all();
        self.session = WizardSession::default();
        for key in DraftKey::DRAFTS {
            if let Err(err) = self.store.clear(key).await {
                debug!(key = key.name(), error = %err, "draft clear skipped");
            }
        }
    }

    /// Commit the session: pending draft writes are cancelled (the draft is
    /// obsolete once the subject commits) and the orchestrator takes over.
    pub async fn submit(
        &mut self,
        orchestrator: &SubmissionOrchestrator<S>,
        client: ClientContext,
    ) -> Result<SubmissionReport, SubmitError> {
        self.persister.cancel_all();
        orchestrator.submit(&mut self.session, client).await
    }

    fn step_complete(&self, step: WizardStep) -> bool {
        match step {
            WizardStep::Profile => {
                let profile = &self.session.profile;
                !profile.name.trim().is_empty()
                    && profile
                        .age
                        .map(|age| (1..=120).contains(&age))
                        .unwrap_or(false)
                    && !profile.phone.trim().is_empty()
                    && profile.sex.is_some()
            }
            WizardStep::Metrics => {
                let profile = &self.session.profile;
                profile
                    .weight_kg
                    .map(|weight| (1.0..=500.0).contains(&weight))
                    .unwrap_or(false)
                    && profile
                        .height_cm
                        .map(|height| (50.0..=250.0).contains(&height))
                        .unwrap_or(false)
            }
            WizardStep::Questionnaire => self.session.answers.is_complete(),
            WizardStep::Results => true,
        }
    }

    fn queue_aggregate<T: serde::Serialize>(&self, key: DraftKey, aggregate: &T) {
        let value = match serde_json::to_value(aggregate) {
            Ok(value) => value,
            Err(err) => {
                debug!(key = key.name(), error = %err, "draft snapshot skipped");
                return;
            }
        };
        let store = Arc::clone(&self.store);
        self.persister.queue(
            key,
            Box::pin(async move {
                if let Err(err) = store.save(key, &value).await {
                    debug!(key = key.name(), error = %err, "draft persist skipped");
                }
            }),
        );
    }

    // The step number is written eagerly on navigation; only the two input
    // aggregates go through the debounce window.
    async fn persist_step(&self) {
        let value = json!(self.session.current_step.number());
        if let Err(err) = self.store.save(DraftKey::Step, &value).await {
            debug!(key = DraftKey::Step.name(), error = %err, "step persist skipped");
        }
    }

    async fn load_draft<T: DeserializeOwned>(&self, key: DraftKey) -> Option<T> {
        match self.store.load(key).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(parsed) => Some(parsed),
                Err(err) => {
                    debug!(key = key.name(), error = %err, "draft unreadable");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                debug!(key = key.name(), error = %err, "draft load skipped");
                None
            }
        }
    }
}
