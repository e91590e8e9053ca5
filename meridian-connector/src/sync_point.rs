use crate::error::{ConnectorError, Result};
use async_trait::async_trait;
use meridian_core::config::kv_paths;
use meridian_kv::KvStore;
use serde_json::Value;
use std::sync::Arc;

/// Persisted cursor/checkpoint state for a connector, keyed by
/// `connector_id` (spec §4.G step 2). Mirrors the original `ISyncPoint`
/// interface's create/update/delete/read shape rather than collapsing it
/// into a single KV `set`.
#[async_trait]
pub trait SyncPointStore: Send + Sync {
    async fn read(&self, connector_id: &str) -> Result<Option<Value>>;
    async fn create(&self, connector_id: &str, data: Value) -> Result<()>;
    async fn update(&self, connector_id: &str, data: Value) -> Result<()>;
    async fn delete(&self, connector_id: &str) -> Result<()>;
}

pub struct KvSyncPointStore {
    kv: Arc<dyn KvStore>,
}

impl KvSyncPointStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }
}

#[async_trait]
impl SyncPointStore for KvSyncPointStore {
    async fn read(&self, connector_id: &str) -> Result<Option<Value>> {
        let Some(raw) = self.kv.get(&kv_paths::sync_point(connector_id)).await? else {
            return Ok(None);
        };
        serde_json::from_slice(&raw).map(Some).map_err(|error| ConnectorError::SyncPoint(error.to_string()))
    }

    async fn create(&self, connector_id: &str, data: Value) -> Result<()> {
        self.update(connector_id, data).await
    }

    async fn update(&self, connector_id: &str, data: Value) -> Result<()> {
        let serialized = serde_json::to_vec(&data).map_err(|error| ConnectorError::SyncPoint(error.to_string()))?;
        self.kv.set(&kv_paths::sync_point(connector_id), serialized, None).await?;
        Ok(())
    }

    async fn delete(&self, connector_id: &str) -> Result<()> {
        self.kv.delete(&kv_paths::sync_point(connector_id)).await?;
        Ok(())
    }
}
