//! Token Refresh Service (spec 4.D). Two independent instances share this
//! implementation: one for connector credentials, one for toolset
//! credentials.

use async_trait::async_trait;
use meridian_kv::KvStore;
use rand::Rng;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

const SKEW_SECONDS: i64 = 60;
const JITTER_MAX_SECONDS: i64 = 30;
const MAX_RETRY_ATTEMPTS: u32 = 5;
const DEGRADED_RESCHEDULE_SECONDS: i64 = 5 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshFailureKind {
    /// Transient network/5xx/429 — retry with backoff.
    Retryable,
    /// `invalid_grant`, revoked — never retried.
    Terminal,
}

#[derive(Debug, Clone)]
pub struct RefreshFailure {
    pub kind: RefreshFailureKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStatus {
    Active,
    Degraded,
    Invalid,
}

/// Provider-specific refresh. Implemented once per connector/toolset kind.
#[async_trait]
pub trait CredentialRefresher: Send + Sync {
    async fn refresh(&self, credential_id: &str) -> Result<RefreshedToken, RefreshFailure>;
}

/// Emitted when a credential transitions to `invalid` — spec calls this a
/// "user-visible event". The supervisor only classifies; callers decide how
/// to surface it (e.g. publish on `meridian-mq`).
pub type TerminalFailureHook = Arc<dyn Fn(&str, &str) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
struct HeapEntry {
    refresh_at: i64,
    credential_id: String,
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse so `BinaryHeap` (a max-heap) behaves as a min-heap on
        // `refresh_at`.
        other.refresh_at.cmp(&self.refresh_at)
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct CredentialBookkeeping {
    attempts: u32,
    status: CredentialStatus,
}

/// One refresh scheduler instance. Construct one for connectors and one for
/// toolsets (`TokenRefreshSupervisor` below owns both).
pub struct TokenRefreshService<R: CredentialRefresher> {
    name: &'static str,
    refresher: R,
    heap: AsyncMutex<BinaryHeap<HeapEntry>>,
    locks: RwLock<HashMap<String, Arc<AsyncMutex<()>>>>,
    bookkeeping: AsyncMutex<HashMap<String, CredentialBookkeeping>>,
    on_terminal: Option<TerminalFailureHook>,
    /// Writes a successfully refreshed token back to the KV store under
    /// the same key it was read from (spec: "the single source of truth
    /// for credentials"). `kv_key_of` maps a credential id to its KV path.
    kv: Option<Arc<dyn KvStore>>,
    kv_key_of: Option<Arc<dyn Fn(&str) -> String + Send + Sync>>,
}

impl<R: CredentialRefresher> TokenRefreshService<R> {
    pub fn new(name: &'static str, refresher: R) -> Self {
        Self {
            name,
            refresher,
            heap: AsyncMutex::new(BinaryHeap::new()),
            locks: RwLock::new(HashMap::new()),
            bookkeeping: AsyncMutex::new(HashMap::new()),
            on_terminal: None,
            kv: None,
            kv_key_of: None,
        }
    }

    pub fn with_terminal_hook(mut self, hook: TerminalFailureHook) -> Self {
        self.on_terminal = Some(hook);
        self
    }

    pub fn with_kv_writeback(
        mut self,
        kv: Arc<dyn KvStore>,
        kv_key_of: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.kv = Some(kv);
        self.kv_key_of = Some(Arc::new(kv_key_of));
        self
    }

    async fn write_back(&self, credential_id: &str, refreshed: &RefreshedToken) {
        let (Some(kv), Some(kv_key_of)) = (&self.kv, &self.kv_key_of) else {
            return;
        };
        let key = kv_key_of(credential_id);
        let body = serde_json::json!({
            "access_token": refreshed.access_token,
            "refresh_token": refreshed.refresh_token,
            "access_token_expiry_time": refreshed.expires_at,
        });
        let bytes = match serde_json::to_vec(&body) {
            Ok(bytes) => bytes,
            Err(error) => {
                tracing::warn!(service = self.name, credential_id, %error, "failed to serialize refreshed credential");
                return;
            }
        };
        if let Err(error) = kv.set(&key, bytes, None).await {
            tracing::warn!(service = self.name, credential_id, %key, %error, "failed to write refreshed credential to kv store");
        }
    }

    fn jittered_refresh_at(expires_at: i64) -> i64 {
        let jitter = rand::thread_rng().gen_range(0..=JITTER_MAX_SECONDS);
        expires_at - SKEW_SECONDS - jitter
    }

    /// Registers a credential's current expiry. Called on initial load and
    /// after every successful or degraded refresh.
    pub async fn register(&self, credential_id: impl Into<String>, expires_at: i64) {
        let credential_id = credential_id.into();
        let refresh_at = Self::jittered_refresh_at(expires_at);
        self.heap.lock().await.push(HeapEntry { refresh_at, credential_id });
    }

    pub async fn status(&self, credential_id: &str) -> Option<CredentialStatus> {
        self.bookkeeping.lock().await.get(credential_id).map(|b| b.status)
    }

    async fn lock_for(&self, credential_id: &str) -> Arc<AsyncMutex<()>> {
        if let Some(lock) = self.locks.read().await.get(credential_id) {
            return lock.clone();
        }
        let mut locks = self.locks.write().await;
        locks.entry(credential_id.to_string()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
    }

    /// Pops the single next-due entry and attempts its refresh. Returns
    /// `None` when the heap is empty (caller should sleep and retry).
    async fn tick(&self) -> Option<()> {
        let entry = self.heap.lock().await.pop()?;
        let now = now_unix();
        if entry.refresh_at > now {
            // Not due yet; put it back and signal the caller to wait.
            self.heap.lock().await.push(entry);
            return None;
        }

        let credential_id = entry.credential_id.clone();
        let per_key_lock = self.lock_for(&credential_id).await;
        let _guard = per_key_lock.lock().await;

        match self.refresher.refresh(&credential_id).await {
            Ok(refreshed) => {
                self.write_back(&credential_id, &refreshed).await;
                let mut bookkeeping = self.bookkeeping.lock().await;
                bookkeeping.insert(
                    credential_id.clone(),
                    CredentialBookkeeping { attempts: 0, status: CredentialStatus::Active },
                );
                drop(bookkeeping);
                self.register(credential_id, refreshed.expires_at).await;
            }
            Err(failure) => self.handle_failure(credential_id, failure).await,
        }
        Some(())
    }

    async fn handle_failure(&self, credential_id: String, failure: RefreshFailure) {
        match failure.kind {
            RefreshFailureKind::Terminal => {
                let mut bookkeeping = self.bookkeeping.lock().await;
                bookkeeping.insert(
                    credential_id.clone(),
                    CredentialBookkeeping { attempts: 0, status: CredentialStatus::Invalid },
                );
                drop(bookkeeping);
                tracing::warn!(
                    service = self.name,
                    credential_id = %credential_id,
                    reason = %failure.message,
                    "credential marked invalid, not rescheduling"
                );
                if let Some(hook) = &self.on_terminal {
                    hook(&credential_id, &failure.message);
                }
            }
            RefreshFailureKind::Retryable => {
                let mut bookkeeping = self.bookkeeping.lock().await;
                let entry = bookkeeping.entry(credential_id.clone()).or_insert(CredentialBookkeeping {
                    attempts: 0,
                    status: CredentialStatus::Active,
                });
                entry.attempts += 1;
                let attempts = entry.attempts;

                if attempts >= MAX_RETRY_ATTEMPTS {
                    entry.status = CredentialStatus::Degraded;
                    drop(bookkeeping);
                    tracing::warn!(
                        service = self.name,
                        credential_id = %credential_id,
                        attempts,
                        "exhausted retry attempts, marking degraded and rescheduling at 5m"
                    );
                    self.heap.lock().await.push(HeapEntry {
                        refresh_at: now_unix() + DEGRADED_RESCHEDULE_SECONDS,
                        credential_id,
                    });
                } else {
                    drop(bookkeeping);
                    let backoff = (2i64.saturating_pow(attempts)).min(60);
                    let jitter = rand::thread_rng().gen_range(0..=5);
                    tracing::info!(
                        service = self.name,
                        credential_id = %credential_id,
                        attempts,
                        backoff_seconds = backoff,
                        "retryable refresh failure, backing off"
                    );
                    self.heap.lock().await.push(HeapEntry {
                        refresh_at: now_unix() + backoff + jitter,
                        credential_id,
                    });
                }
            }
        }
    }

    /// Runs the single-worker loop until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = async {
                    if self.tick().await.is_none() {
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                } => {}
            }
        }
    }
}

fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};

    struct AlwaysSucceeds;

    #[async_trait]
    impl CredentialRefresher for AlwaysSucceeds {
        async fn refresh(&self, _credential_id: &str) -> Result<RefreshedToken, RefreshFailure> {
            Ok(RefreshedToken {
                access_token: "new-token".into(),
                refresh_token: None,
                expires_at: now_unix() + 3600,
            })
        }
    }

    struct AlwaysTerminal;

    #[async_trait]
    impl CredentialRefresher for AlwaysTerminal {
        async fn refresh(&self, _credential_id: &str) -> Result<RefreshedToken, RefreshFailure> {
            Err(RefreshFailure { kind: RefreshFailureKind::Terminal, message: "invalid_grant".into() })
        }
    }

    struct CountingRetryable(AtomicU32);

    #[async_trait]
    impl CredentialRefresher for CountingRetryable {
        async fn refresh(&self, _credential_id: &str) -> Result<RefreshedToken, RefreshFailure> {
            self.0.fetch_add(1, AtomicOrdering::SeqCst);
            Err(RefreshFailure { kind: RefreshFailureKind::Retryable, message: "503".into() })
        }
    }

    #[test]
    fn jittered_refresh_at_is_before_expiry_by_at_least_skew() {
        let expires_at = 10_000;
        let refresh_at = TokenRefreshService::<AlwaysSucceeds>::jittered_refresh_at(expires_at);
        assert!(refresh_at <= expires_at - SKEW_SECONDS);
        assert!(refresh_at >= expires_at - SKEW_SECONDS - JITTER_MAX_SECONDS);
    }

    #[tokio::test]
    async fn successful_refresh_reschedules_and_marks_active() {
        let service = TokenRefreshService::new("connector", AlwaysSucceeds);
        service.register("cred-1", now_unix() - 10).await;
        assert!(service.tick().await.is_some());
        assert_eq!(service.status("cred-1").await, Some(CredentialStatus::Active));
    }

    #[tokio::test]
    async fn terminal_failure_marks_invalid_and_fires_hook() {
        let fired = Arc::new(AtomicU32::new(0));
        let fired_clone = fired.clone();
        let service = TokenRefreshService::new("connector", AlwaysTerminal)
            .with_terminal_hook(Arc::new(move |_id, _msg| {
                fired_clone.fetch_add(1, AtomicOrdering::SeqCst);
            }));
        service.register("cred-1", now_unix() - 10).await;
        service.tick().await;
        assert_eq!(service.status("cred-1").await, Some(CredentialStatus::Invalid));
        assert_eq!(fired.load(AtomicOrdering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retryable_failure_reschedules_for_later() {
        let service = TokenRefreshService::new("connector", CountingRetryable(AtomicU32::new(0)));
        service.register("cred-1", now_unix() - 10).await;
        service.tick().await;
        // Not due again immediately (backoff pushed it into the future).
        assert!(service.tick().await.is_none());
        assert_eq!(service.status("cred-1").await, Some(CredentialStatus::Active));
    }

    #[tokio::test]
    async fn not_due_entries_are_left_on_the_heap() {
        let service = TokenRefreshService::new("connector", AlwaysSucceeds);
        service.register("cred-1", now_unix() + 10_000).await;
        assert!(service.tick().await.is_none());
    }

    #[tokio::test]
    async fn successful_refresh_writes_new_token_to_kv() {
        let kv: Arc<dyn KvStore> = Arc::new(meridian_kv::InMemoryKvStore::new());
        let service = TokenRefreshService::new("connector", AlwaysSucceeds)
            .with_kv_writeback(kv.clone(), |id| format!("/services/connectors/{id}/config"));
        service.register("drive", now_unix() - 10).await;
        service.tick().await;

        let stored = kv.get("/services/connectors/drive/config").await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&stored).unwrap();
        assert_eq!(value["access_token"], "new-token");
    }
}
