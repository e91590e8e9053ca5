use crate::error::Result;
use async_trait::async_trait;
use std::pin::Pin;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

/// What happened to a watched key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvEventKind {
    Put,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvEvent {
    pub key: String,
    pub kind: KvEventKind,
}

/// `connect / disconnect / set(key,val,ttl) / get(key) / delete(key) / watch(prefix)`.
///
/// Values are opaque bytes; callers serialize. Keys are path-like
/// (`/services/...`). Implementations may encrypt values at rest —
/// callers must not assume plaintext durability beyond this interface.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn connect(&self) -> Result<()>;
    async fn disconnect(&self) -> Result<()>;
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()>;
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn delete(&self, key: &str) -> Result<()>;

    /// A stream of `KvEvent`s for keys starting with `prefix`. Backed by a
    /// broadcast channel: subscribers only see events published after they
    /// subscribe, and a slow subscriber may miss events under heavy load
    /// (spec makes no durability promise for `watch`).
    fn watch(&self, prefix: &str) -> Pin<Box<dyn Stream<Item = KvEvent> + Send>>;
}

/// Shared helper for `KvStore` implementations built on a
/// `tokio::sync::broadcast` change feed: turns the raw broadcast receiver
/// into a prefix-filtered stream, dropping lagged-subscriber errors.
pub(crate) fn watch_broadcast(
    rx: tokio::sync::broadcast::Receiver<KvEvent>,
    prefix: &str,
) -> Pin<Box<dyn Stream<Item = KvEvent> + Send>> {
    let prefix = prefix.to_string();
    let stream = BroadcastStream::new(rx)
        .filter_map(|item| item.ok())
        .filter(move |event| event.key.starts_with(&prefix));
    Box::pin(stream)
}
