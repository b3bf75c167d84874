use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::screening::debounce::{PersistJob, PersistScheduler, ScheduledPersist};
use crate::screening::domain::{
    Answer, AnswerSet, QuestionId, Sex, SubjectProfile, SubmissionState, WizardSession, WizardStep,
};
use crate::screening::store::{DraftKey, SessionStore, StoreError};
use crate::screening::submission::{
    ClientContext, PayloadMetadata, SinkError, SinkReceipt, SubmissionPayload, SubmissionSink,
};

/// Store fake that records every write so tests can assert on persistence,
/// with an optional always-failing mode for the swallowed-error paths.
#[derive(Default)]
pub(super) struct RecordingStore {
    entries: Mutex<HashMap<DraftKey, Value>>,
    saves: Mutex<Vec<(DraftKey, Value)>>,
    fail: bool,
}

impl RecordingStore {
    pub(super) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(super) fn seed(&self, key: DraftKey, value: Value) {
        self.entries
            .lock()
            .expect("store mutex poisoned")
            .insert(key, value);
    }

    pub(super) fn entry(&self, key: DraftKey) -> Option<Value> {
        self.entries
            .lock()
            .expect("store mutex poisoned")
            .get(&key)
            .cloned()
    }

    pub(super) fn saves_for(&self, key: DraftKey) -> Vec<Value> {
        self.saves
            .lock()
            .expect("store mutex poisoned")
            .iter()
            .filter(|(saved_key, _)| *saved_key == key)
            .map(|(_, value)| value.clone())
            .collect()
    }
}

#[async_trait]
impl SessionStore for RecordingStore {
    async fn save(&self, key: DraftKey, value: &Value) -> Result<(), StoreError> {
        if self.fail {
            return Err(StoreError::Unavailable("store offline".to_string()));
        }
        self.entries
            .lock()
            .expect("store mutex poisoned")
            .insert(key, value.clone());
        self.saves
            .lock()
            .expect("store mutex poisoned")
            .push((key, value.clone()));
        Ok(())
    }

    async fn load(&self, key: DraftKey) -> Result<Option<Value>, StoreError> {
        if self.fail {
            return Err(StoreError::Unavailable("store offline".to_string()));
        }
        Ok(self
            .entries
            .lock()
            .expect("store mutex poisoned")
            .get(&key)
            .cloned())
    }

    async fn clear(&self, key: DraftKey) -> Result<(), StoreError> {
        if self.fail {
            return Err(StoreError::Unavailable("store offline".to_string()));
        }
        self.entries
            .lock()
            .expect("store mutex poisoned")
            .remove(&key);
        Ok(())
    }
}

/// Scheduler fake: holds queued jobs until the test fires them, so debounce
/// behavior is exercised without wall-clock timers.
#[derive(Default)]
pub(super) struct ManualScheduler {
    queued: Mutex<Vec<(ScheduledPersist, PersistJob)>>,
}

impl ManualScheduler {
    pub(super) fn queued_jobs(&self) -> usize {
        self.queued.lock().expect("scheduler mutex poisoned").len()
    }

    /// Run every queued job whose handle was not cancelled.
    pub(super) async fn fire_due(&self) {
        let jobs: Vec<_> = self
            .queued
            .lock()
            .expect("scheduler mutex poisoned")
            .drain(..)
            .collect();
        for (handle, job) in jobs {
            if !handle.is_cancelled() {
                job.await;
            }
        }
    }
}

impl PersistScheduler for ManualScheduler {
    fn schedule(&self, _delay: Duration, job: PersistJob) -> ScheduledPersist {
        let handle = ScheduledPersist::new();
        self.queued
            .lock()
            .expect("scheduler mutex poisoned")
            .push((handle.clone(), job));
        handle
    }
}

enum SinkScript {
    Succeed,
    Fail(&'static str),
}

/// Sink fake with a scripted outcome; records every payload it was handed.
pub(super) struct ScriptedSink {
    name: &'static str,
    script: SinkScript,
    sent: Mutex<Vec<SubmissionPayload>>,
}

impl ScriptedSink {
    pub(super) fn succeeding(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            script: SinkScript::Succeed,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub(super) fn failing(name: &'static str, reason: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            script: SinkScript::Fail(reason),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub(super) fn sent(&self) -> Vec<SubmissionPayload> {
        self.sent.lock().expect("sink mutex poisoned").clone()
    }
}

#[async_trait]
impl SubmissionSink for ScriptedSink {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn send(&self, payload: &SubmissionPayload) -> Result<SinkReceipt, SinkError> {
        self.sent
            .lock()
            .expect("sink mutex poisoned")
            .push(payload.clone());
        match self.script {
            SinkScript::Succeed => Ok(SinkReceipt {
                sink: self.name,
                reference: Some(format!("{}-receipt", self.name)),
            }),
            SinkScript::Fail(reason) => Err(SinkError::Transport(reason.to_string())),
        }
    }
}

/// Profile from the reference scenario: 55-year-old male, 100 kg, 170 cm.
pub(super) fn scenario_profile() -> SubjectProfile {
    SubjectProfile {
        name: "Omar Khalid".to_string(),
        age: Some(55),
        phone: "0501234567".to_string(),
        sex: Some(Sex::Male),
        weight_kg: Some(100.0),
        height_cm: Some(170.0),
    }
}

/// Answers from the reference scenario: snoring, tiredness, and hypertension
/// reported; observed apnea and neck circumference denied.
pub(super) fn scenario_answers() -> AnswerSet {
    let mut answers = AnswerSet::default();
    answers.record(QuestionId::Snoring, Answer::Yes);
    answers.record(QuestionId::Tiredness, Answer::Yes);
    answers.record(QuestionId::ObservedApnea, Answer::No);
    answers.record(QuestionId::Hypertension, Answer::Yes);
    answers.record(QuestionId::NeckCircumference, Answer::No);
    answers
}

/// Yes to the first `count` questions, no to the rest.
pub(super) fn answers_with_yes(count: usize) -> AnswerSet {
    let mut answers = AnswerSet::default();
    for (index, question) in QuestionId::ALL.into_iter().enumerate() {
        let answer = if index < count { Answer::Yes } else { Answer::No };
        answers.record(question, answer);
    }
    answers
}

pub(super) fn complete_session() -> WizardSession {
    WizardSession {
        current_step: WizardStep::Results,
        profile: scenario_profile(),
        answers: scenario_answers(),
        submission_state: SubmissionState::Idle,
    }
}

pub(super) fn metadata() -> PayloadMetadata {
    PayloadMetadata {
        submitted_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single().expect("valid timestamp"),
        session_id: "session-test".to_string(),
        source_tag: "stop-bang-screening".to_string(),
        client: ClientContext {
            user_agent: "test-agent".to_string(),
            referrer: "direct".to_string(),
        },
    }
}
