use crate::runtime::Connector;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-local registry of initialized connector instances, keyed by
/// `connector_id` (spec §4.F "stores the initialized instance under
/// `connector_id` in a process-local registry").
#[derive(Default)]
pub struct ConnectorRegistry {
    connectors: RwLock<HashMap<String, Arc<Connector>>>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self { connectors: RwLock::new(HashMap::new()) }
    }

    pub async fn put(&self, connector_id: &str, connector: Arc<Connector>) {
        self.connectors.write().await.insert(connector_id.to_string(), connector);
    }

    pub async fn get(&self, connector_id: &str) -> Option<Arc<Connector>> {
        self.connectors.read().await.get(connector_id).cloned()
    }

    pub async fn remove(&self, connector_id: &str) -> Option<Arc<Connector>> {
        self.connectors.write().await.remove(connector_id)
    }

    pub async fn contains(&self, connector_id: &str) -> bool {
        self.connectors.read().await.contains_key(connector_id)
    }
}
