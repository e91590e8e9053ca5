use crate::config::RuntimeConfig;
use crate::stub::{LoggingBlobStore, LoggingGraphStore, LoggingVectorStore, NullConnectorFactory, NullCredentialRefresher};
use meridian_auth::{PermissionManager, TokenRefreshSupervisor};
use meridian_cache::CacheManager;
use meridian_connector::ConnectorRegistry;
use meridian_events::EventDispatcher;
use meridian_kv::{InMemoryKvStore, KvStore};
use meridian_mq::{Consumer, InMemoryBroker, Producer};
use meridian_schema::SchemaRegistry;
use meridian_sync::SyncTaskManager;
use meridian_tool::{ToolLoader, ToolRegistry};
use meridian_transform::TransformPipeline;
use std::sync::Arc;

const CONNECTOR_EVENTS_TOPIC: &str = "connector.events";

/// Every shared component a running process needs (spec component 4,
/// process wiring). Mirrors the original `StartupService`: one struct
/// assembled once at boot, handed down to whatever drives requests
/// (an agent-loop entry point, a connector event handler, ...).
pub struct Platform {
    pub kv: Arc<dyn KvStore>,
    pub cache: Arc<CacheManager>,
    pub permissions: Arc<PermissionManager>,
    pub tool_registry: Arc<ToolRegistry>,
    pub tool_loader: ToolLoader,
    pub schema_registry: Arc<SchemaRegistry>,
    pub transform: Arc<TransformPipeline>,
    pub connector_registry: Arc<ConnectorRegistry>,
    pub sync_tasks: Arc<SyncTaskManager>,
    pub broker: Arc<InMemoryBroker>,
    pub dispatcher: Arc<EventDispatcher>,
    refresh_supervisor: TokenRefreshSupervisor<NullCredentialRefresher, NullCredentialRefresher>,
}

impl Platform {
    pub async fn bootstrap(config: &RuntimeConfig) -> anyhow::Result<Self> {
        let kv: Arc<dyn KvStore> = Arc::new(InMemoryKvStore::new());
        kv.connect().await?;

        let cache = Arc::new(CacheManager::new(
            config.llm_cache_size,
            config.cache_ttl(),
            config.tool_cache_size,
            config.cache_ttl(),
            config.retrieval_cache_size,
            config.cache_ttl(),
        ));

        let permissions = Arc::new(PermissionManager::new());
        let tool_registry = Arc::new(ToolRegistry::new());
        let tool_loader = ToolLoader::new(tool_registry.clone());
        let schema_registry = Arc::new(SchemaRegistry::new());

        let transform = Arc::new(TransformPipeline::new(
            Arc::new(LoggingBlobStore),
            Arc::new(LoggingVectorStore),
            Arc::new(LoggingGraphStore),
            schema_registry.clone(),
        ));

        let connector_registry = Arc::new(ConnectorRegistry::new());
        let sync_tasks = Arc::new(SyncTaskManager::new());
        let broker = Arc::new(InMemoryBroker::new());
        let dispatcher = Arc::new(EventDispatcher::new(
            connector_registry.clone(),
            sync_tasks.clone(),
            Arc::new(NullConnectorFactory),
        ));

        let refresh_supervisor = TokenRefreshSupervisor::new(NullCredentialRefresher, NullCredentialRefresher);

        Ok(Self {
            kv,
            cache,
            permissions,
            tool_registry,
            tool_loader,
            schema_registry,
            transform,
            connector_registry,
            sync_tasks,
            broker,
            dispatcher,
            refresh_supervisor,
        })
    }

    /// Starts the token-refresh supervisor and the connector-events
    /// consumer loop (mirrors `StartupService.initialize`).
    pub async fn start(&mut self) -> anyhow::Result<()> {
        self.refresh_supervisor.start();

        self.broker.subscribe(CONNECTOR_EVENTS_TOPIC, self.dispatcher.clone().into_handler()).await?;

        tracing::info!(topic = CONNECTOR_EVENTS_TOPIC, "event consumer loop started");
        Ok(())
    }

    /// Stops the refresh supervisor and cancels every in-flight sync task
    /// (mirrors `StartupService.shutdown`).
    pub async fn shutdown(&mut self) {
        tracing::info!("shutting down");
        self.refresh_supervisor.stop().await;
        self.sync_tasks.cancel_all().await;
        let _ = self.kv.disconnect().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bootstrap_then_start_then_shutdown_does_not_hang() {
        let config = RuntimeConfig::default();
        let mut platform = Platform::bootstrap(&config).await.unwrap();
        platform.start().await.unwrap();
        platform.shutdown().await;
    }

    #[tokio::test]
    async fn dispatching_an_event_with_no_registered_factory_never_registers_a_connector() {
        let config = RuntimeConfig::default();
        let mut platform = Platform::bootstrap(&config).await.unwrap();
        platform.start().await.unwrap();

        platform
            .broker
            .publish(
                CONNECTOR_EVENTS_TOPIC,
                meridian_mq::Message::new("drive.init", serde_json::json!({"connectorId": "c1", "orgId": "org1"})),
            )
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!platform.connector_registry.contains("c1").await);

        platform.shutdown().await;
    }
}
