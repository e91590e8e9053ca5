use crate::error::ConnectorError;
use futures::stream::BoxStream;
use meridian_core::Record;
use serde_json::Value;

/// Everything the Transform pipeline needs to ingest one fetched item (spec
/// §4.G step 4: "convert to Record + subtype + edges").
pub struct SourceItem {
    pub record: Record,
    pub content: Vec<u8>,
    pub chunks: Vec<String>,
    pub vector_namespace: String,
    pub graph_collection: String,
    pub graph_document: Value,
    pub graph_edges: Vec<(String, Value)>,
    pub graph_permissions: Vec<Value>,
    /// Opaque cursor value to persist as the sync point once this item has
    /// been transformed successfully.
    pub cursor_after: Value,
}

/// The provider-specific half of a connector: everything this crate is
/// deliberately metadata-only about (spec §1 Non-goals — no concrete
/// third-party SDK call surfaces live here). A real deployment supplies one
/// implementation per [`crate::ConnectorKind`]; this crate supplies only the
/// generic `run_sync` harness that drives it.
#[async_trait::async_trait]
pub trait ConnectorSource: Send + Sync {
    fn kind(&self) -> crate::ConnectorKind;

    /// Credential/reachability probe (spec §4.G `test_connection_and_access`).
    async fn test_connection_and_access(&self) -> Result<bool, ConnectorError>;

    /// A finite, non-restartable sequence of source items starting from
    /// `sync_point` (`None` means "from the beginning"). Each run of
    /// `run_sync` calls this exactly once and drains it to completion or
    /// cancellation (spec §4.G step 3).
    fn fetch_items(&self, sync_point: Option<Value>) -> BoxStream<'static, Result<SourceItem, ConnectorError>>;
}
