use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

/// Fixed names for the per-session documents the adapter persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftKey {
    Profile,
    Answers,
    Step,
    FailedSubmission,
}

impl DraftKey {
    /// The working-draft keys discarded on restart or submission.
    pub const DRAFTS: [DraftKey; 3] = [DraftKey::Profile, DraftKey::Answers, DraftKey::Step];

    pub const fn name(self) -> &'static str {
        match self {
            DraftKey::Profile => "profile-draft",
            DraftKey::Answers => "answers-draft",
            DraftKey::Step => "step-draft",
            DraftKey::FailedSubmission => "failed-submission-archive",
        }
    }
}

/// Store failures. Callers swallow every variant and behave as if no draft
/// exists; nothing here reaches the subject.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store quota exceeded")]
    QuotaExceeded,
}

/// Session-scoped key/value persistence seam.
///
/// Injected into the wizard and the orchestrator so tests can substitute a
/// recording fake. Durability is best-effort: a value is only expected to
/// survive a reload of the same session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(&self, key: DraftKey, value: &Value) -> Result<(), StoreError>;
    async fn load(&self, key: DraftKey) -> Result<Option<Value>, StoreError>;
    async fn clear(&self, key: DraftKey) -> Result<(), StoreError>;
}

/// Mutex-guarded map store backing one live session.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    entries: Mutex<HashMap<DraftKey, Value>>,
}

impl InMemorySessionStore {
    /// Inspection helper for tests and the operator-facing archive view.
    pub fn snapshot(&self, key: DraftKey) -> Option<Value> {
        self.entries
            .lock()
            .expect("store mutex poisoned")
            .get(&key)
            .cloned()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save(&self, key: DraftKey, value: &Value) -> Result<(), StoreError> {
        self.entries
            .lock()
            .expect("store mutex poisoned")
            .insert(key, value.clone());
        Ok(())
    }

    async fn load(&self, key: DraftKey) -> Result<Option<Value>, StoreError> {
        Ok(self
            .entries
            .lock()
            .expect("store mutex poisoned")
            .get(&key)
            .cloned())
    }

    async fn clear(&self, key: DraftKey) -> Result<(), StoreError> {
        self.entries
            .lock()
            .expect("store mutex poisoned")
            .remove(&key);
        Ok(())
    }
}
