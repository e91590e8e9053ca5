use crate::error::Result;
use crate::kind::ConnectorKind;
use crate::source::ConnectorSource;
use crate::sync_point::SyncPointStore;
use futures::StreamExt;
use meridian_core::{IndexingStatus, SyncReport, SyncStatus};
use meridian_mq::{Message, Producer};
use meridian_transform::{TransformContext, TransformPipeline};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The outbound topic `run_sync` completion events publish to (spec.md
/// "Outbound: a reconciliation topic for sink completion events").
pub const RECONCILIATION_TOPIC: &str = "reconciliation.events";

/// A single connector instance: a pluggable [`ConnectorSource`] plus the
/// generic `run_sync` harness every connector shares (spec §4.G). The
/// harness owns cursor persistence, per-item transform dispatch, and
/// cancellation; the source owns only "how do I talk to this provider".
pub struct Connector {
    connector_id: String,
    source: Arc<dyn ConnectorSource>,
    sync_points: Arc<dyn SyncPointStore>,
    transform: Arc<TransformPipeline>,
    completion_publisher: Option<(Arc<dyn Producer>, String)>,
}

impl Connector {
    pub fn new(
        connector_id: impl Into<String>,
        source: Arc<dyn ConnectorSource>,
        sync_points: Arc<dyn SyncPointStore>,
        transform: Arc<TransformPipeline>,
    ) -> Self {
        Self { connector_id: connector_id.into(), source, sync_points, transform, completion_publisher: None }
    }

    /// Wires a `Producer` to publish a completion event on
    /// [`RECONCILIATION_TOPIC`] at the end of every `run_sync` (spec §4.G
    /// step 6), keyed by `org_key` (spec.md "keys are `orgId` where
    /// partitioning matters").
    pub fn with_completion_publisher(mut self, producer: Arc<dyn Producer>, org_key: impl Into<String>) -> Self {
        self.completion_publisher = Some((producer, org_key.into()));
        self
    }

    pub fn connector_id(&self) -> &str {
        &self.connector_id
    }

    pub fn kind(&self) -> ConnectorKind {
        self.source.kind()
    }

    pub async fn init(&self) -> Result<bool> {
        self.test_connection_and_access().await
    }

    pub async fn test_connection_and_access(&self) -> Result<bool> {
        self.source.test_connection_and_access().await
    }

    /// Bumps the persisted `sync_epoch` counter without discarding the
    /// cursor, so a replayed `resync` event is distinguishable in sync-point
    /// history from an initial `start` (see DESIGN.md Open Question 3).
    pub async fn bump_sync_epoch(&self) -> Result<()> {
        let mut point = self.sync_points.read(&self.connector_id).await?.unwrap_or_else(|| serde_json::json!({}));
        let epoch = point.get("sync_epoch").and_then(serde_json::Value::as_u64).unwrap_or(0);
        point["sync_epoch"] = serde_json::json!(epoch + 1);
        self.sync_points.update(&self.connector_id, point).await
    }

    /// Drives the source's item stream to completion or cancellation,
    /// transforming each item and advancing the persisted sync point after
    /// every successful transform (spec §4.G steps 1-6).
    pub async fn run_sync(&self, cancel: CancellationToken) -> Result<SyncReport> {
        let sync_point = self.sync_points.read(&self.connector_id).await?;
        let mut report = SyncReport::default();
        let mut items = self.source.fetch_items(sync_point);

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(connector_id = %self.connector_id, "run_sync cancelled");
                    report.finalize(SyncStatus::Cancelled);
                    return Ok(report);
                }
                item = items.next() => item,
            };

            let Some(item) = next else {
                break;
            };

            let item = match item {
                Ok(item) => item,
                Err(error) => {
                    tracing::warn!(connector_id = %self.connector_id, %error, "source item fetch failed, continuing");
                    report.record_failure("unknown", error.to_string());
                    continue;
                }
            };

            let record_id = item.record.record_key.to_string();
            let cursor_after = item.cursor_after.clone();
            let ctx = TransformContext {
                record: item.record,
                content: item.content,
                chunks: item.chunks,
                vector_namespace: item.vector_namespace,
                graph_collection: item.graph_collection,
                graph_document: item.graph_document,
                graph_edges: item.graph_edges,
                reconciliation_context: None,
                graph_permissions: item.graph_permissions,
            };

            match self.transform.process(&ctx).await {
                Ok(outcome) if outcome.final_status == IndexingStatus::Completed => {
                    report.record_success();
                    if let Err(error) = self.sync_points.update(&self.connector_id, cursor_after).await {
                        tracing::warn!(connector_id = %self.connector_id, %error, "failed to persist sync point after successful item");
                    }
                }
                Ok(outcome) => {
                    let status = format!("{:?}", outcome.final_status);
                    tracing::warn!(connector_id = %self.connector_id, record_id = %record_id, status = %status, "record marked failed, continuing");
                    report.record_failure(record_id, "transform pipeline reported a terminal failure");
                }
                Err(error) => {
                    tracing::warn!(connector_id = %self.connector_id, record_id = %record_id, %error, "transform raised a contract error, continuing");
                    report.record_failure(record_id, error.to_string());
                }
            }
        }

        report.finalize(if report.failed == 0 { SyncStatus::Completed } else { SyncStatus::CompletedWithErrors });
        tracing::info!(connector_id = %self.connector_id, total = report.total, failed = report.failed, "run_sync completed");

        if let Some((producer, org_key)) = &self.completion_publisher {
            let payload = serde_json::json!({
                "connectorId": self.connector_id,
                "total": report.total,
                "processed": report.processed,
                "failed": report.failed,
                "status": report.status,
            });
            let message = Message::new("connector.sync.completed", payload).with_key(org_key.clone());
            if let Err(error) = producer.publish(RECONCILIATION_TOPIC, message).await {
                tracing::warn!(connector_id = %self.connector_id, %error, "failed to publish sync completion event");
            }
        }

        Ok(report)
    }

    pub async fn cleanup(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ConnectorSource, SourceItem};
    use crate::sync_point::KvSyncPointStore;
    use async_trait::async_trait;
    use futures::stream::{self, BoxStream};
    use meridian_core::{Record, RecordType};
    use meridian_kv::{InMemoryKvStore, KvStore};
    use meridian_schema::SchemaRegistry;
    use meridian_transform::{BlobStore, GraphStore, VectorStore};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TwoItemSource;

    fn item(n: u32) -> SourceItem {
        let mut record = Record::new(format!("r{n}"), "org1", format!("ext{n}"), RecordType::File, "drive");
        record.virtual_record_id = Some(format!("vrid-{n}"));
        SourceItem {
            record,
            content: format!("content-{n}").into_bytes(),
            chunks: vec![format!("content-{n}")],
            vector_namespace: "records".into(),
            graph_collection: "records".into(),
            graph_document: json!({"name": format!("doc-{n}")}),
            graph_edges: vec![],
            graph_permissions: vec![],
            cursor_after: json!({"cursor": n}),
        }
    }

    #[async_trait]
    impl ConnectorSource for TwoItemSource {
        fn kind(&self) -> ConnectorKind {
            ConnectorKind::Drive
        }
        async fn test_connection_and_access(&self) -> Result<bool> {
            Ok(true)
        }
        fn fetch_items(&self, _sync_point: Option<Value>) -> BoxStream<'static, Result<SourceItem>> {
            Box::pin(stream::iter(vec![Ok(item(1)), Ok(item(2))]))
        }
    }

    struct CountingGraph {
        count: AtomicUsize,
    }

    #[async_trait]
    impl GraphStore for CountingGraph {
        async fn upsert_node(&self, _collection: &str, _document: &Value) -> meridian_transform::Result<()> {
            self.count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn upsert_edge(&self, _collection: &str, _edge: &Value) -> meridian_transform::Result<()> {
            Ok(())
        }
        async fn upsert_permissions(&self, _permissions: &[Value]) -> meridian_transform::Result<()> {
            Ok(())
        }
    }

    struct NoopBlob;
    #[async_trait]
    impl BlobStore for NoopBlob {
        async fn exists(&self, _v: &str, _h: &str) -> meridian_transform::Result<bool> {
            Ok(false)
        }
        async fn put(&self, _v: &str, _h: &str, _c: &[u8]) -> meridian_transform::Result<()> {
            Ok(())
        }
        async fn put_reconciliation_metadata(&self, _v: &str, _m: &Value) -> meridian_transform::Result<()> {
            Ok(())
        }
    }
    struct NoopVector;
    #[async_trait]
    impl VectorStore for NoopVector {
        async fn upsert(&self, _n: &str, _r: &str, _c: &[String]) -> meridian_transform::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn run_sync_processes_every_item_and_persists_final_cursor() {
        let kv: Arc<dyn KvStore> = Arc::new(InMemoryKvStore::new());
        let sync_points: Arc<dyn SyncPointStore> = Arc::new(KvSyncPointStore::new(kv));
        let graph = Arc::new(CountingGraph { count: AtomicUsize::new(0) });
        let transform = Arc::new(TransformPipeline::new(
            Arc::new(NoopBlob),
            Arc::new(NoopVector),
            graph.clone(),
            Arc::new(SchemaRegistry::new()),
        ));
        let connector = Connector::new("drive-1", Arc::new(TwoItemSource), sync_points.clone(), transform);

        let report = connector.run_sync(CancellationToken::new()).await.unwrap();

        assert_eq!(report.total, 2);
        assert_eq!(report.failed, 0);
        assert_eq!(report.status, SyncStatus::Completed);
        assert_eq!(graph.count.load(Ordering::SeqCst), 2);
        assert_eq!(sync_points.read("drive-1").await.unwrap(), Some(json!({"cursor": 2})));
    }

    #[tokio::test]
    async fn bump_sync_epoch_increments_without_losing_cursor() {
        let kv: Arc<dyn KvStore> = Arc::new(InMemoryKvStore::new());
        let sync_points: Arc<dyn SyncPointStore> = Arc::new(KvSyncPointStore::new(kv));
        sync_points.create("drive-1", json!({"cursor": 7})).await.unwrap();
        let transform = Arc::new(TransformPipeline::new(
            Arc::new(NoopBlob),
            Arc::new(NoopVector),
            Arc::new(CountingGraph { count: AtomicUsize::new(0) }),
            Arc::new(SchemaRegistry::new()),
        ));
        let connector = Connector::new("drive-1", Arc::new(TwoItemSource), sync_points.clone(), transform);

        connector.bump_sync_epoch().await.unwrap();
        connector.bump_sync_epoch().await.unwrap();

        let point = sync_points.read("drive-1").await.unwrap().unwrap();
        assert_eq!(point["cursor"], json!(7));
        assert_eq!(point["sync_epoch"], json!(2));
    }

    struct RecordingProducer {
        published: std::sync::Mutex<Vec<meridian_mq::Message>>,
    }

    #[async_trait]
    impl Producer for RecordingProducer {
        async fn publish(&self, topic: &str, message: meridian_mq::Message) -> meridian_mq::Result<()> {
            assert_eq!(topic, RECONCILIATION_TOPIC);
            self.published.lock().unwrap().push(message);
            Ok(())
        }
    }

    #[tokio::test]
    async fn run_sync_publishes_a_completion_event_keyed_by_org() {
        let kv: Arc<dyn KvStore> = Arc::new(InMemoryKvStore::new());
        let sync_points: Arc<dyn SyncPointStore> = Arc::new(KvSyncPointStore::new(kv));
        let transform = Arc::new(TransformPipeline::new(
            Arc::new(NoopBlob),
            Arc::new(NoopVector),
            Arc::new(CountingGraph { count: AtomicUsize::new(0) }),
            Arc::new(SchemaRegistry::new()),
        ));
        let producer = Arc::new(RecordingProducer { published: std::sync::Mutex::new(Vec::new()) });
        let connector = Connector::new("drive-1", Arc::new(TwoItemSource), sync_points, transform)
            .with_completion_publisher(producer.clone(), "org1");

        let report = connector.run_sync(CancellationToken::new()).await.unwrap();

        let published = producer.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].event_type, "connector.sync.completed");
        assert_eq!(published[0].key.as_deref(), Some("org1"));
        assert_eq!(published[0].payload["total"], json!(report.total));
    }

    #[tokio::test]
    async fn run_sync_honors_pre_cancelled_token() {
        let kv: Arc<dyn KvStore> = Arc::new(InMemoryKvStore::new());
        let sync_points: Arc<dyn SyncPointStore> = Arc::new(KvSyncPointStore::new(kv));
        let transform = Arc::new(TransformPipeline::new(
            Arc::new(NoopBlob),
            Arc::new(NoopVector),
            Arc::new(CountingGraph { count: AtomicUsize::new(0) }),
            Arc::new(SchemaRegistry::new()),
        ));
        let connector = Connector::new("drive-1", Arc::new(TwoItemSource), sync_points, transform);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let report = connector.run_sync(cancel).await.unwrap();
        assert_eq!(report.status, SyncStatus::Cancelled);
    }
}
