use crate::error::EventError;
use meridian_connector::{Connector, ConnectorRegistry};
use meridian_mq::{Handler, Message};
use meridian_sync::SyncTaskManager;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Builds the fully wired [`Connector`] for a freshly observed
/// `connectorId`, given the connector family named in the event type
/// (`drive`, `gmail`, ...) and the event payload. Deliberately the only
/// seam where provider-specific wiring enters this crate.
#[async_trait::async_trait]
pub trait ConnectorFactory: Send + Sync {
    async fn create(&self, connector_type: &str, connector_id: &str, payload: &Value) -> Result<Arc<Connector>, EventError>;
}

/// Routes `<connector_type>.{init,start,resync,stop}` events to connector
/// lifecycle operations (spec §4.F). Handlers are idempotent so that the
/// at-least-once delivery from the underlying [`meridian_mq::Consumer`] is
/// safe to redeliver.
pub struct EventDispatcher {
    registry: Arc<ConnectorRegistry>,
    sync_tasks: Arc<SyncTaskManager>,
    factory: Arc<dyn ConnectorFactory>,
}

fn connector_id_of(payload: &Value) -> Option<&str> {
    payload.get("connectorId").and_then(Value::as_str)
}

impl EventDispatcher {
    pub fn new(registry: Arc<ConnectorRegistry>, sync_tasks: Arc<SyncTaskManager>, factory: Arc<dyn ConnectorFactory>) -> Self {
        Self { registry, sync_tasks, factory }
    }

    /// Dispatches one inbound message. Returns `true` to acknowledge,
    /// `false` to request redelivery (spec §4.F "Delivery").
    pub async fn dispatch(&self, message: Message) -> bool {
        let Some((connector_type, action)) = message.event_type.rsplit_once('.') else {
            tracing::warn!(event_type = %message.event_type, "event type has no <connector>.<action> shape, dropping");
            return true;
        };

        let Some(connector_id) = connector_id_of(&message.payload).map(str::to_string) else {
            tracing::warn!(event_type = %message.event_type, "payload is missing connectorId, dropping");
            return true;
        };
        if message.payload.get("orgId").and_then(Value::as_str).is_none() {
            tracing::warn!(event_type = %message.event_type, "payload is missing orgId, dropping");
            return true;
        }

        match action {
            "init" => self.handle_init(connector_type, &connector_id, &message.payload).await,
            "start" => self.handle_start(&connector_id, false).await,
            "resync" => self.handle_start(&connector_id, true).await,
            "stop" => self.handle_stop(&connector_id).await,
            other => {
                tracing::warn!(event_type = %message.event_type, action = other, "unrecognized event action, dropping");
                true
            }
        }
    }

    /// Idempotent: re-issuing `init` for an already-initialized id cancels
    /// any in-flight sync task for it and awaits that cancellation before
    /// the new instance replaces the old one in the registry (spec §4.F).
    async fn handle_init(&self, connector_type: &str, connector_id: &str, payload: &Value) -> bool {
        if self.registry.contains(connector_id).await {
            self.sync_tasks.cancel(connector_id).await;
        }

        let connector = match self.factory.create(connector_type, connector_id, payload).await {
            Ok(connector) => connector,
            Err(error) => {
                tracing::warn!(connector_id, %error, "connector construction failed");
                return false;
            }
        };

        match connector.test_connection_and_access().await {
            Ok(true) => {
                self.registry.put(connector_id, connector).await;
                tracing::info!(connector_id, "connector initialized");
                true
            }
            Ok(false) => {
                tracing::warn!(connector_id, "credential probe rejected");
                false
            }
            Err(error) => {
                tracing::warn!(connector_id, %error, "credential probe errored");
                false
            }
        }
    }

    async fn handle_start(&self, connector_id: &str, resync: bool) -> bool {
        let Some(connector) = self.registry.get(connector_id).await else {
            tracing::warn!(connector_id, "start/resync requested for an uninitialized connector");
            return false;
        };

        if resync {
            if let Err(error) = connector.bump_sync_epoch().await {
                tracing::warn!(connector_id, %error, "failed to bump sync epoch");
                return false;
            }
        }

        let id = connector_id.to_string();
        self.sync_tasks
            .start(connector_id, move |cancel| run_sync_task(connector, id, cancel))
            .await;
        true
    }

    async fn handle_stop(&self, connector_id: &str) -> bool {
        self.sync_tasks.cancel(connector_id).await;
        true
    }

    /// Adapts [`Self::dispatch`] to the [`Handler`] shape
    /// [`meridian_mq::Consumer::subscribe`] expects.
    pub fn into_handler(self: Arc<Self>) -> Handler {
        Arc::new(move |message: Message| -> Pin<Box<dyn Future<Output = bool> + Send>> {
            let dispatcher = self.clone();
            Box::pin(async move { dispatcher.dispatch(message).await })
        })
    }
}

async fn run_sync_task(connector: Arc<Connector>, connector_id: String, cancel: tokio_util::sync::CancellationToken) {
    match connector.run_sync(cancel).await {
        Ok(report) => {
            tracing::info!(connector_id, total = report.total, failed = report.failed, "sync run finished");
        }
        Err(error) => {
            tracing::warn!(connector_id, %error, "sync run raised an error");
        }
    }
}
