//! Fire-and-forget sync triggered by local mutations.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};

use super::remote::RemoteStore;
use super::synchronizer::{SyncError, SyncOutcome, Synchronizer};
use crate::state::SyncState;
use crate::storage::KeyValueStore;

const OUTCOME_CAPACITY: usize = 16;

#[derive(Debug, Default)]
struct Gate {
    running: bool,
    queued: bool,
}

struct Inner<S, R> {
    synchronizer: Synchronizer<S, R>,
    gate: Mutex<Gate>,
    state: watch::Sender<SyncState>,
    outcomes: broadcast::Sender<SyncOutcome>,
}

/// Something that can be asked to sync soon.
pub trait SyncTrigger: Send + Sync {
    fn request(&self);
}

/// Single-flight background runner for a [`Synchronizer`].
///
/// At most one run is in flight. Requests that arrive during a run collapse
/// into a single follow-up run, so a burst of mutations costs two round trips
/// at most.
pub struct BackgroundSync<S, R> {
    inner: Arc<Inner<S, R>>,
}

impl<S, R> Clone for BackgroundSync<S, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, R> BackgroundSync<S, R>
where
    S: KeyValueStore + 'static,
    R: RemoteStore + 'static,
{
    pub fn new(synchronizer: Synchronizer<S, R>) -> Self {
        let (state, _) = watch::channel(SyncState::Idle);
        let (outcomes, _) = broadcast::channel(OUTCOME_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                synchronizer,
                gate: Mutex::new(Gate::default()),
                state,
                outcomes,
            }),
        }
    }

    /// Schedule a sync without waiting for it.
    pub fn request(&self) {
        let Ok(handle) = Handle::try_current() else {
            tracing::warn!("No async runtime available; skipping background sync");
            return;
        };

        {
            let mut gate = self.inner.lock_gate();
            if gate.running {
                gate.queued = true;
                tracing::debug!("Sync already in flight; queued a follow-up run");
                return;
            }
            gate.running = true;
            self.inner.state.send_replace(SyncState::Syncing);
        }

        let inner = Arc::clone(&self.inner);
        handle.spawn(async move { inner.run().await });
    }

    pub fn state(&self) -> SyncState {
        *self.inner.state.borrow()
    }

    /// Receive the outcome of every run that completes after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncOutcome> {
        self.inner.outcomes.subscribe()
    }

    /// Resolve once nothing is in flight or queued.
    pub async fn wait_idle(&self) {
        let mut state = self.inner.state.subscribe();
        // The sender lives in `inner`, so the channel cannot close here.
        let _ = state.wait_for(|current| !current.is_busy()).await;
    }

    pub fn synchronizer(&self) -> &Synchronizer<S, R> {
        &self.inner.synchronizer
    }
}

impl<S, R> SyncTrigger for BackgroundSync<S, R>
where
    S: KeyValueStore + 'static,
    R: RemoteStore + 'static,
{
    fn request(&self) {
        Self::request(self);
    }
}

impl<S, R> Inner<S, R>
where
    S: KeyValueStore,
    R: RemoteStore,
{
    fn lock_gate(&self) -> MutexGuard<'_, Gate> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run(&self) {
        loop {
            let outcome = self.synchronizer.sync().await;
            log_outcome(&outcome);
            let settled = settled_state(&outcome);
            // No subscribers is fine.
            let _ = self.outcomes.send(outcome);

            let rerun = {
                let mut gate = self.lock_gate();
                if gate.queued {
                    gate.queued = false;
                    true
                } else {
                    gate.running = false;
                    self.state.send_replace(settled);
                    false
                }
            };
            if !rerun {
                break;
            }
        }
    }
}

fn settled_state(outcome: &SyncOutcome) -> SyncState {
    match outcome {
        Ok(_) => SyncState::Synced,
        Err(SyncError::NotConfigured) => SyncState::Idle,
        Err(_) => SyncState::Failed,
    }
}

fn log_outcome(outcome: &SyncOutcome) {
    match outcome {
        Ok(report) => tracing::info!(
            records = report.merged_records,
            users = report.merged_users,
            "Cloud sync completed"
        ),
        Err(SyncError::NotConfigured) => {
            tracing::debug!("Cloud sync skipped: not configured");
        }
        Err(error) if error.is_partial_consistency() => tracing::warn!(
            "Cloud sync saved locally but did not reach the remote: {error}"
        ),
        Err(error) => tracing::warn!("Cloud sync failed: {error}"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use super::*;
    use crate::storage::{MemoryStore, StoreKey};
    use crate::sync::remote::RemoteError;
    use crate::sync::testing::{base_time, configured_store, record, FakeRemote};
    use pretty_assertions::assert_eq;

    fn background(
        store: &Arc<MemoryStore>,
        remote: &Arc<FakeRemote>,
    ) -> BackgroundSync<MemoryStore, FakeRemote> {
        BackgroundSync::new(Synchronizer::new(Arc::clone(store), Arc::clone(remote)))
    }

    #[tokio::test]
    async fn burst_of_requests_coalesces_into_two_runs() {
        let store = configured_store();
        let remote = Arc::new(FakeRemote::slow(Duration::from_millis(20)));
        let sync = background(&store, &remote);

        for _ in 0..5 {
            sync.request();
        }
        assert_eq!(sync.state(), SyncState::Syncing);
        sync.wait_idle().await;

        assert_eq!(remote.fetches.load(Ordering::SeqCst), 2);
        assert_eq!(remote.pushes.load(Ordering::SeqCst), 2);
        assert_eq!(sync.state(), SyncState::Synced);
    }

    #[tokio::test]
    async fn request_after_idle_starts_a_new_run() {
        let store = configured_store();
        let remote = Arc::new(FakeRemote::default());
        let sync = background(&store, &remote);

        sync.request();
        sync.wait_idle().await;
        sync.request();
        sync.wait_idle().await;

        assert_eq!(remote.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn subscribers_receive_each_outcome() {
        let store = configured_store();
        store
            .save(StoreKey::Records, &vec![record("r1", base_time(), 10)])
            .unwrap();
        let remote = Arc::new(FakeRemote::default());
        let sync = background(&store, &remote);
        let mut outcomes = sync.subscribe();

        sync.request();
        let report = outcomes.recv().await.unwrap().unwrap();

        assert_eq!(report.merged_records, 1);
        assert_eq!(remote.document().records.len(), 1);
    }

    #[tokio::test]
    async fn failed_run_is_swallowed_and_reported() {
        let store = configured_store();
        let remote = Arc::new(FakeRemote::default());
        *remote.fail_fetch.lock().unwrap() = Some(RemoteError::Http("offline".into()));
        let sync = background(&store, &remote);
        let mut outcomes = sync.subscribe();

        sync.request();
        let error = outcomes.recv().await.unwrap().unwrap_err();
        sync.wait_idle().await;

        assert!(matches!(error, SyncError::FetchFailed(_)));
        assert_eq!(sync.state(), SyncState::Failed);
    }

    #[tokio::test]
    async fn unconfigured_run_settles_idle_without_calls() {
        let store = Arc::new(MemoryStore::new());
        let remote = Arc::new(FakeRemote::default());
        let sync = background(&store, &remote);

        sync.request();
        sync.wait_idle().await;

        assert_eq!(sync.state(), SyncState::Idle);
        assert_eq!(remote.calls(), 0);
    }

    #[test]
    fn request_outside_runtime_is_dropped() {
        let store = configured_store();
        let remote = Arc::new(FakeRemote::default());
        let sync = background(&store, &remote);

        sync.request();

        assert_eq!(sync.state(), SyncState::Idle);
        assert_eq!(remote.calls(), 0);
    }
}
