use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future::BoxFuture;

use super::store::DraftKey;

/// Deferred persistence work queued behind the quiet period.
pub type PersistJob = BoxFuture<'static, ()>;

/// Scheduling seam for the debounce quiet period, so tests drive persistence
/// deterministically instead of waiting on wall-clock timers.
pub trait PersistScheduler: Send + Sync {
    fn schedule(&self, delay: Duration, job: PersistJob) -> ScheduledPersist;
}

/// Cancellation handle for a scheduled persist.
#[derive(Debug, Clone, Default)]
pub struct ScheduledPersist {
    cancelled: Arc<AtomicBool>,
}

impl ScheduledPersist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Production scheduler: a spawned task that sleeps out the quiet period and
/// runs the job unless it was cancelled in the meantime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPersistScheduler;

impl PersistScheduler for TokioPersistScheduler {
    fn schedule(&self, delay: Duration, job: PersistJob) -> ScheduledPersist {
        let handle = ScheduledPersist::new();
        let guard = handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !guard.is_cancelled() {
                job.await;
            }
        });
        handle
    }
}

/// Last-write-wins draft persistence: queueing a write for a key cancels and
/// supersedes the pending write for that key. This is the workflow's only
/// cancellation semantic.
pub struct DebouncedPersister {
    scheduler: Arc<dyn PersistScheduler>,
    quiet_period: Duration,
    pending: Mutex<HashMap<DraftKey, ScheduledPersist>>,
}

impl DebouncedPersister {
    pub fn new(scheduler: Arc<dyn PersistScheduler>, quiet_period: Duration) -> Self {
        Self {
            scheduler,
            quiet_period,
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn queue(&self, key: DraftKey, job: PersistJob) {
        let mut pending = self.pending.lock().expect("persist mutex poisoned");
        if let Some(previous) = pending.remove(&key) {
            previous.cancel();
        }
        let handle = self.scheduler.schedule(self.quiet_period, job);
        pending.insert(key, handle);
    }

    /// Drop every pending write; used when the draft itself becomes obsolete
    /// (restart, or the moment a submission is committed).
    pub fn cancel_all(&self) {
        let mut pending = self.pending.lock().expect("persist mutex poisoned");
        for (_, handle) in pending.drain() {
            handle.cancel();
        }
    }
}
