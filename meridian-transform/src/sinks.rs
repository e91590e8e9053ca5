use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Content-addressed raw storage, keyed by `virtualRecordId` + content hash
/// for idempotent writes (spec §4.H stage 1).
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn exists(&self, virtual_record_id: &str, content_hash: &str) -> Result<bool>;
    async fn put(&self, virtual_record_id: &str, content_hash: &str, content: &[u8]) -> Result<()>;
    async fn put_reconciliation_metadata(&self, virtual_record_id: &str, metadata: &Value) -> Result<()>;
}

/// Chunk + embed + upsert under the record's vector namespace (spec §4.H
/// stage 2). Chunking/embedding themselves are out of scope here; callers
/// hand the orchestrator pre-chunked text.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn upsert(&self, namespace: &str, record_key: &str, chunks: &[String]) -> Result<()>;
}

/// Record + subtype + edges + permissions upsert (spec §4.H stage 4). Node
/// documents are validated against the collection's JSON Schema before this
/// trait is ever called.
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn upsert_node(&self, collection: &str, document: &Value) -> Result<()>;
    async fn upsert_edge(&self, collection: &str, edge: &Value) -> Result<()>;
    async fn upsert_permissions(&self, permissions: &[Value]) -> Result<()>;
}
