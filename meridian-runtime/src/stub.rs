//! Local-dev stand-ins for the provider-specific seams spec.md's Non-goals
//! put out of scope (specific third-party SDK call surfaces, specific
//! graph/vector query languages): sink backends and the connector factory.
//! A real deployment registers real implementations here the same way
//! `ConnectorRegistry::put` lets a caller override a single connector
//! instance — these are the process-wide defaults, not a hard requirement.

use async_trait::async_trait;
use meridian_auth::{CredentialRefresher, RefreshFailure, RefreshFailureKind, RefreshedToken};
use meridian_events::ConnectorFactory;
use meridian_transform::{BlobStore, GraphStore, VectorStore};
use serde_json::Value;
use std::sync::Arc;

/// Logs writes instead of persisting them. Suitable for local development
/// and smoke tests; never durable.
#[derive(Default)]
pub struct LoggingBlobStore;

#[async_trait]
impl BlobStore for LoggingBlobStore {
    async fn exists(&self, _virtual_record_id: &str, _content_hash: &str) -> meridian_transform::Result<bool> {
        Ok(false)
    }

    async fn put(&self, virtual_record_id: &str, content_hash: &str, content: &[u8]) -> meridian_transform::Result<()> {
        tracing::debug!(virtual_record_id, content_hash, bytes = content.len(), "blob sink (logging stub)");
        Ok(())
    }

    async fn put_reconciliation_metadata(&self, virtual_record_id: &str, metadata: &Value) -> meridian_transform::Result<()> {
        tracing::debug!(virtual_record_id, %metadata, "reconciliation metadata sink (logging stub)");
        Ok(())
    }
}

#[derive(Default)]
pub struct LoggingVectorStore;

#[async_trait]
impl VectorStore for LoggingVectorStore {
    async fn upsert(&self, namespace: &str, record_key: &str, chunks: &[String]) -> meridian_transform::Result<()> {
        tracing::debug!(namespace, record_key, chunks = chunks.len(), "vector sink (logging stub)");
        Ok(())
    }
}

#[derive(Default)]
pub struct LoggingGraphStore;

#[async_trait]
impl GraphStore for LoggingGraphStore {
    async fn upsert_node(&self, collection: &str, document: &Value) -> meridian_transform::Result<()> {
        tracing::debug!(collection, %document, "graph node sink (logging stub)");
        Ok(())
    }

    async fn upsert_edge(&self, collection: &str, edge: &Value) -> meridian_transform::Result<()> {
        tracing::debug!(collection, %edge, "graph edge sink (logging stub)");
        Ok(())
    }

    async fn upsert_permissions(&self, permissions: &[Value]) -> meridian_transform::Result<()> {
        tracing::debug!(count = permissions.len(), "graph permissions sink (logging stub)");
        Ok(())
    }
}

/// Refuses every connector construction. Real deployments register a
/// factory that dispatches on `connector_type` to a provider-specific
/// `ConnectorSource` (spec §4.G); this is the seam, not an implementation.
pub struct NullConnectorFactory;

#[async_trait]
impl ConnectorFactory for NullConnectorFactory {
    async fn create(
        &self,
        connector_type: &str,
        connector_id: &str,
        _payload: &Value,
    ) -> Result<Arc<meridian_connector::Connector>, meridian_events::EventError> {
        tracing::warn!(connector_type, connector_id, "no connector factory registered for this connector type");
        Err(meridian_events::EventError::FactoryFailed(format!("no provider registered for '{connector_type}'")))
    }
}

/// Always reports a terminal failure. Real deployments supply one
/// `CredentialRefresher` per connector/toolset provider family; this is
/// the default until one is wired in.
pub struct NullCredentialRefresher;

#[async_trait]
impl CredentialRefresher for NullCredentialRefresher {
    async fn refresh(&self, credential_id: &str) -> Result<RefreshedToken, RefreshFailure> {
        tracing::warn!(credential_id, "no credential refresher registered");
        Err(RefreshFailure { kind: RefreshFailureKind::Terminal, message: "no refresher configured".to_string() })
    }
}
