use crate::error::{Result, TransformError};
use crate::reconcile::{content_hash, ReconciliationContext};
use crate::sinks::{BlobStore, GraphStore, VectorStore};
use meridian_core::{IndexingStatus, Record};
use meridian_schema::{SchemaRegistry, ValidationMode};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Sink apply is the lowest layer that knows an operation is safe to retry
/// (spec §7 propagation policy); transient sink failures are retried here
/// with exponential backoff before the record is marked failed.
const MAX_SINK_ATTEMPTS: u32 = 5;

async fn backoff_sleep(attempt: u32) {
    use rand::Rng;
    let base = 2u64.saturating_pow(attempt).min(30);
    let jitter = rand::thread_rng().gen_range(0..500);
    tokio::time::sleep(Duration::from_millis(base * 1000 + jitter)).await;
}

/// Everything one pass through the pipeline needs for a single record (spec
/// §4.H `TransformContext`).
pub struct TransformContext {
    pub record: Record,
    pub content: Vec<u8>,
    pub chunks: Vec<String>,
    pub vector_namespace: String,
    pub graph_collection: String,
    pub graph_document: Value,
    pub graph_edges: Vec<(String, Value)>,
    pub graph_permissions: Vec<Value>,
    pub reconciliation_context: Option<ReconciliationContext>,
}

/// Outcome of a single sink stage for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageResult {
    Applied,
    Skipped(String),
    Failed(String),
    NotAttempted,
}

impl StageResult {
    pub fn is_failed(&self) -> bool {
        matches!(self, StageResult::Failed(_))
    }
}

#[derive(Debug, Clone)]
pub struct TransformReport {
    pub blob: StageResult,
    pub vector: StageResult,
    pub reconciliation: StageResult,
    pub graph: StageResult,
    pub final_status: IndexingStatus,
    pub content_hash: String,
}

/// Applies sinks in the fixed order the spec mandates: blob, vector,
/// reconciliation metadata, graph. Never a DAG engine — later stages assume
/// the invariants the earlier ones establish (spec §4.H).
pub struct TransformPipeline {
    blob: Arc<dyn BlobStore>,
    vector: Arc<dyn VectorStore>,
    graph: Arc<dyn GraphStore>,
    schema_registry: Arc<SchemaRegistry>,
}

impl TransformPipeline {
    pub fn new(
        blob: Arc<dyn BlobStore>,
        vector: Arc<dyn VectorStore>,
        graph: Arc<dyn GraphStore>,
        schema_registry: Arc<SchemaRegistry>,
    ) -> Self {
        Self { blob, vector, graph, schema_registry }
    }

    pub async fn process(&self, ctx: &TransformContext) -> Result<TransformReport> {
        let virtual_record_id = ctx
            .record
            .virtual_record_id
            .clone()
            .ok_or_else(|| TransformError::Contract("record has no virtualRecordId".into()))?;
        let hash = content_hash(&ctx.content);

        let blob = self.apply_blob(&virtual_record_id, &hash, &ctx.content).await;
        if blob.is_failed() {
            tracing::warn!(record_key = %ctx.record.record_key, "blob sink failed, record marked fatal");
            return Ok(TransformReport {
                blob,
                vector: StageResult::NotAttempted,
                reconciliation: StageResult::NotAttempted,
                graph: StageResult::NotAttempted,
                final_status: IndexingStatus::Failed,
                content_hash: hash,
            });
        }

        let vector = self.apply_vector(ctx, &hash).await;
        if vector.is_failed() {
            tracing::warn!(record_key = %ctx.record.record_key, "vector sink failed, aborting remaining sinks");
            return Ok(TransformReport {
                blob,
                vector,
                reconciliation: StageResult::NotAttempted,
                graph: StageResult::NotAttempted,
                final_status: IndexingStatus::Failed,
                content_hash: hash,
            });
        }

        let reconciliation = self.apply_reconciliation(ctx, &virtual_record_id).await;

        let graph = self.apply_graph(ctx).await;
        let final_status = if graph.is_failed() { IndexingStatus::Failed } else { IndexingStatus::Completed };

        Ok(TransformReport { blob, vector, reconciliation, graph, final_status, content_hash: hash })
    }

    async fn apply_blob(&self, virtual_record_id: &str, hash: &str, content: &[u8]) -> StageResult {
        match self.blob.exists(virtual_record_id, hash).await {
            Ok(true) => return StageResult::Skipped("content already stored under this hash".into()),
            Ok(false) => {}
            Err(error) => return StageResult::Failed(error.to_string()),
        }
        self.with_retry(|| self.blob.put(virtual_record_id, hash, content)).await
    }

    async fn apply_vector(&self, ctx: &TransformContext, hash: &str) -> StageResult {
        let unchanged = ctx
            .reconciliation_context
            .as_ref()
            .map(|reconciliation| !reconciliation.content_changed(hash))
            .unwrap_or(false);
        if ctx.record.indexing_status == IndexingStatus::Completed && unchanged {
            return StageResult::Skipped("indexing status already completed with unchanged content".into());
        }
        self.with_retry(|| self.vector.upsert(&ctx.vector_namespace, ctx.record.record_key.as_str(), &ctx.chunks)).await
    }

    /// Retries `op` up to [`MAX_SINK_ATTEMPTS`] times while the error it
    /// returns classifies as transient; any other kind fails immediately.
    async fn with_retry<F, Fut>(&self, op: F) -> StageResult
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<()>>,
    {
        for attempt in 0..MAX_SINK_ATTEMPTS {
            match op().await {
                Ok(()) => return StageResult::Applied,
                Err(error) if error.kind() == meridian_core::ErrorKind::Transient && attempt + 1 < MAX_SINK_ATTEMPTS => {
                    tracing::warn!(attempt, %error, "sink apply failed transiently, retrying");
                    backoff_sleep(attempt).await;
                }
                Err(error) => return StageResult::Failed(error.to_string()),
            }
        }
        unreachable!("loop always returns before exhausting attempts")
    }

    async fn apply_reconciliation(&self, ctx: &TransformContext, virtual_record_id: &str) -> StageResult {
        let Some(reconciliation) = &ctx.reconciliation_context else {
            return StageResult::NotAttempted;
        };
        let metadata = reconciliation.previous_metadata.clone().unwrap_or(Value::Null);
        match self.blob.put_reconciliation_metadata(virtual_record_id, &metadata).await {
            Ok(()) => StageResult::Applied,
            Err(error) => StageResult::Failed(error.to_string()),
        }
    }

    async fn apply_graph(&self, ctx: &TransformContext) -> StageResult {
        if let Err(error) = self.schema_registry.validate(&ctx.graph_collection, &ctx.graph_document, ValidationMode::Full) {
            return StageResult::Failed(error.to_string());
        }
        let node = self.with_retry(|| self.graph.upsert_node(&ctx.graph_collection, &ctx.graph_document)).await;
        if node.is_failed() {
            return node;
        }
        for (collection, edge) in &ctx.graph_edges {
            let result = self.with_retry(|| self.graph.upsert_edge(collection, edge)).await;
            if result.is_failed() {
                return result;
            }
        }
        if !ctx.graph_permissions.is_empty() {
            let result = self.with_retry(|| self.graph.upsert_permissions(&ctx.graph_permissions)).await;
            if result.is_failed() {
                return result;
            }
        }
        StageResult::Applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use meridian_core::{RecordOrigin, RecordType};
    use serde_json::json;
    use std::sync::Mutex;

    struct FakeBlob {
        stored: Mutex<std::collections::HashSet<(String, String)>>,
        fail: bool,
    }

    impl FakeBlob {
        fn new(fail: bool) -> Self {
            Self { stored: Mutex::new(Default::default()), fail }
        }
    }

    #[async_trait]
    impl BlobStore for FakeBlob {
        async fn exists(&self, virtual_record_id: &str, content_hash: &str) -> Result<bool> {
            Ok(self.stored.lock().unwrap().contains(&(virtual_record_id.to_string(), content_hash.to_string())))
        }
        async fn put(&self, virtual_record_id: &str, content_hash: &str, _content: &[u8]) -> Result<()> {
            if self.fail {
                return Err(TransformError::Blob("disk full".into()));
            }
            self.stored.lock().unwrap().insert((virtual_record_id.to_string(), content_hash.to_string()));
            Ok(())
        }
        async fn put_reconciliation_metadata(&self, _virtual_record_id: &str, _metadata: &Value) -> Result<()> {
            Ok(())
        }
    }

    struct FakeVector {
        fail: bool,
        calls: Mutex<u32>,
    }

    #[async_trait]
    impl VectorStore for FakeVector {
        async fn upsert(&self, _namespace: &str, _record_key: &str, _chunks: &[String]) -> Result<()> {
            *self.calls.lock().unwrap() += 1;
            if self.fail {
                return Err(TransformError::Vector("embedding service down".into()));
            }
            Ok(())
        }
    }

    struct FakeGraph {
        calls: Mutex<u32>,
    }

    #[async_trait]
    impl GraphStore for FakeGraph {
        async fn upsert_node(&self, _collection: &str, _document: &Value) -> Result<()> {
            *self.calls.lock().unwrap() += 1;
            Ok(())
        }
        async fn upsert_edge(&self, _collection: &str, _edge: &Value) -> Result<()> {
            Ok(())
        }
        async fn upsert_permissions(&self, _permissions: &[Value]) -> Result<()> {
            Ok(())
        }
    }

    fn record(status: IndexingStatus) -> Record {
        let mut record = Record::new("r1", "org1", "ext1", RecordType::File, "drive");
        record.origin = RecordOrigin::Connector;
        record.indexing_status = status;
        record.virtual_record_id = Some("vrid-1".into());
        record
    }

    fn ctx(status: IndexingStatus, reconciliation: Option<ReconciliationContext>) -> TransformContext {
        TransformContext {
            record: record(status),
            content: b"hello world".to_vec(),
            chunks: vec!["hello world".into()],
            vector_namespace: "records".into(),
            graph_collection: "records".into(),
            graph_document: json!({"name": "doc"}),
            graph_edges: vec![],
            graph_permissions: vec![],
            reconciliation_context: reconciliation,
        }
    }

    fn pipeline(blob_fails: bool, vector_fails: bool) -> (TransformPipeline, Arc<FakeVector>, Arc<FakeGraph>) {
        let blob = Arc::new(FakeBlob::new(blob_fails));
        let vector = Arc::new(FakeVector { fail: vector_fails, calls: Mutex::new(0) });
        let graph = Arc::new(FakeGraph { calls: Mutex::new(0) });
        let registry = Arc::new(SchemaRegistry::new());
        (TransformPipeline::new(blob, vector.clone(), graph.clone(), registry), vector, graph)
    }

    #[tokio::test]
    async fn happy_path_runs_every_stage_and_completes() {
        let (pipeline, _vector, graph) = pipeline(false, false);
        let report = pipeline.process(&ctx(IndexingStatus::NotStarted, None)).await.unwrap();
        assert_eq!(report.blob, StageResult::Applied);
        assert_eq!(report.vector, StageResult::Applied);
        assert_eq!(report.graph, StageResult::Applied);
        assert_eq!(report.final_status, IndexingStatus::Completed);
        assert_eq!(*graph.calls.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn blob_failure_aborts_everything_downstream() {
        let (pipeline, vector, graph) = pipeline(true, false);
        let report = pipeline.process(&ctx(IndexingStatus::NotStarted, None)).await.unwrap();
        assert!(report.blob.is_failed());
        assert_eq!(report.vector, StageResult::NotAttempted);
        assert_eq!(report.graph, StageResult::NotAttempted);
        assert_eq!(report.final_status, IndexingStatus::Failed);
        assert_eq!(*vector.calls.lock().unwrap(), 0);
        assert_eq!(*graph.calls.lock().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn vector_failure_keeps_blob_but_aborts_graph() {
        let (pipeline, _vector, graph) = pipeline(false, true);
        let report = pipeline.process(&ctx(IndexingStatus::NotStarted, None)).await.unwrap();
        assert_eq!(report.blob, StageResult::Applied);
        assert!(report.vector.is_failed());
        assert_eq!(report.graph, StageResult::NotAttempted);
        assert_eq!(report.final_status, IndexingStatus::Failed);
        assert_eq!(*graph.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn vector_is_skipped_when_completed_and_unchanged() {
        let (pipeline, vector, _graph) = pipeline(false, false);
        let hash = content_hash(b"hello world");
        let reconciliation = ReconciliationContext::new(Some(hash), None);
        let report = pipeline.process(&ctx(IndexingStatus::Completed, Some(reconciliation))).await.unwrap();
        assert!(matches!(report.vector, StageResult::Skipped(_)));
        assert_eq!(*vector.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn schema_violation_fails_graph_without_calling_driver() {
        let blob = Arc::new(FakeBlob::new(false));
        let vector = Arc::new(FakeVector { fail: false, calls: Mutex::new(0) });
        let graph = Arc::new(FakeGraph { calls: Mutex::new(0) });
        let registry = Arc::new(SchemaRegistry::new());
        registry.register("records", json!({"type": "object", "required": ["missing_field"]}));
        let pipeline = TransformPipeline::new(blob, vector, graph.clone(), registry);

        let report = pipeline.process(&ctx(IndexingStatus::NotStarted, None)).await.unwrap();
        assert!(report.graph.is_failed());
        assert_eq!(report.final_status, IndexingStatus::Failed);
        assert_eq!(*graph.calls.lock().unwrap(), 0);
    }
}
