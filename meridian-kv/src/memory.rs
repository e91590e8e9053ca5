use crate::error::{KvError, Result};
use crate::store::{watch_broadcast, KvEvent, KvEventKind, KvStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tokio_stream::Stream;

struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at.map(|at| Instant::now() >= at).unwrap_or(false)
    }
}

/// In-memory `KvStore`, grounded on `InMemorySessionService`'s
/// `RwLock<HashMap<..>>` pattern. No durability across process restarts;
/// suitable for tests and single-process development.
pub struct InMemoryKvStore {
    entries: RwLock<HashMap<String, Entry>>,
    changes: broadcast::Sender<KvEvent>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(1024);
        Self { entries: RwLock::new(HashMap::new()), changes }
    }
}

impl Default for InMemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn connect(&self) -> Result<()> {
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        Ok(())
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        let expires_at = ttl.map(|d| Instant::now() + d);
        let mut entries = self.entries.write().map_err(|_| KvError::Backend("lock poisoned".into()))?;
        entries.insert(key.to_string(), Entry { value, expires_at });
        drop(entries);
        let _ = self.changes.send(KvEvent { key: key.to_string(), kind: KvEventKind::Put });
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut entries = self.entries.write().map_err(|_| KvError::Backend("lock poisoned".into()))?;
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| KvError::Backend("lock poisoned".into()))?;
        entries.remove(key);
        drop(entries);
        let _ = self.changes.send(KvEvent { key: key.to_string(), kind: KvEventKind::Delete });
        Ok(())
    }

    fn watch(&self, prefix: &str) -> Pin<Box<dyn Stream<Item = KvEvent> + Send>> {
        watch_broadcast(self.changes.subscribe(), prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn set_then_get_roundtrips() {
        let store = InMemoryKvStore::new();
        store.set("/services/a", b"hello".to_vec(), None).await.unwrap();
        assert_eq!(store.get("/services/a").await.unwrap(), Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let store = InMemoryKvStore::new();
        assert_eq!(store.get("/services/missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_removes_key() {
        let store = InMemoryKvStore::new();
        store.set("/services/a", b"v".to_vec(), None).await.unwrap();
        store.delete("/services/a").await.unwrap();
        assert_eq!(store.get("/services/a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_entry_reads_as_missing() {
        let store = InMemoryKvStore::new();
        store.set("/services/a", b"v".to_vec(), Some(Duration::from_millis(1))).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.get("/services/a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn watch_filters_by_prefix() {
        let store = InMemoryKvStore::new();
        let mut watcher = store.watch("/services/connectors");
        store.set("/services/connectors/drive/config", b"x".to_vec(), None).await.unwrap();
        store.set("/services/other", b"y".to_vec(), None).await.unwrap();

        let event = watcher.next().await.unwrap();
        assert_eq!(event.key, "/services/connectors/drive/config");
        assert_eq!(event.kind, KvEventKind::Put);
    }
}
