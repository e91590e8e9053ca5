//! Sync Task Manager (spec 4.E), grounded 1:1 in control flow on the
//! original `SyncTaskManager`: at most one task per `connector_id`,
//! start-replaces-after-cancel, auto-removal on completion via a
//! generation check so a newer task is never evicted by an older one's
//! done callback.

use futures::future::join_all;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tokio_util::sync::CancellationToken;

struct TaskEntry {
    generation: u64,
    cancel: CancellationToken,
    done_rx: Mutex<Option<oneshot::Receiver<()>>>,
}

pub struct SyncTaskManager {
    tasks: Arc<Mutex<HashMap<String, TaskEntry>>>,
    next_generation: AtomicU64,
}

impl SyncTaskManager {
    pub fn new() -> Self {
        Self { tasks: Arc::new(Mutex::new(HashMap::new())), next_generation: AtomicU64::new(0) }
    }

    /// Cancels and awaits any task already running for `connector_id`, then
    /// launches a new one running `work`. `work` receives the
    /// `CancellationToken` it must check between logical units (per-record,
    /// per-page).
    pub async fn start<F, Fut>(&self, connector_id: &str, work: F)
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel(connector_id).await;

        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        let cancel_token = CancellationToken::new();
        let (done_tx, done_rx) = oneshot::channel();

        let tasks = self.tasks.clone();
        let id = connector_id.to_string();
        let task_cancel = cancel_token.clone();

        // Insert before spawning: the spawned task's own done-callback removes
        // this same entry by generation, and on a multi-threaded runtime it can
        // start and finish before this function resumes after an `.await`. If
        // the insert happened after spawning, a fast `work` could race ahead of
        // it and its removal would be a no-op, orphaning the entry forever.
        self.tasks.lock().await.insert(
            connector_id.to_string(),
            TaskEntry { generation, cancel: cancel_token, done_rx: Mutex::new(Some(done_rx)) },
        );

        tokio::spawn(async move {
            work(task_cancel).await;

            let mut tasks = tasks.lock().await;
            if let Some(entry) = tasks.get(&id) {
                if entry.generation == generation {
                    tasks.remove(&id);
                }
            }
            drop(tasks);
            let _ = done_tx.send(());
        });

        tracing::info!(connector_id, generation, "sync task started");
    }

    /// Signal-cancels and awaits the task for `connector_id`, absorbing
    /// completion either way. Idempotent: a no-op if nothing is running.
    pub async fn cancel(&self, connector_id: &str) {
        let entry = self.tasks.lock().await.remove(connector_id);
        let Some(entry) = entry else {
            return;
        };
        tracing::info!(connector_id, "cancelling sync task");
        entry.cancel.cancel();
        if let Some(rx) = entry.done_rx.lock().await.take() {
            let _ = rx.await;
        }
        tracing::debug!(connector_id, "sync task cancelled");
    }

    /// Cancels every registered task concurrently and awaits all of them.
    pub async fn cancel_all(&self) {
        let connector_ids: Vec<String> = self.tasks.lock().await.keys().cloned().collect();
        tracing::info!(count = connector_ids.len(), "cancelling all sync tasks");
        join_all(connector_ids.iter().map(|id| self.cancel(id))).await;
    }

    /// True iff a non-completed task is registered for `connector_id`.
    pub async fn is_running(&self, connector_id: &str) -> bool {
        self.tasks.lock().await.contains_key(connector_id)
    }
}

impl Default for SyncTaskManager {
    fn default() -> Self {
        Self::new()
    }
}
