//! Shared data model, identifiers, and error taxonomy for the Meridian
//! knowledge-ingestion and agent-execution platform.

pub mod block;
pub mod config;
pub mod error;
pub mod ids;
pub mod permission;
pub mod record;
pub mod tool;

pub use block::{Block, BlockDataFormat, BlockGroup, BlockType, BlocksContainer};
pub use error::{ErrorKind, IndexingError, RecordFailure, SyncReport, SyncStatus};
pub use ids::{ConnectorId, ExternalId, OrgKey, RecordKey, ToolsetInstanceId, UserId};
pub use permission::{Permission, PermissionRole, PrincipalEntityType};
pub use record::{
    FileChecksums, FileRecord, FileRecordBundle, IndexingStatus, IsOfTypeEdge, Record, RecordOrigin,
    RecordType,
};
pub use tool::{PrimaryIntent, ToolMetadata, ToolParameter};

/// Canonical JSON encoding used wherever the spec calls for a "canonical
/// JSON encoding of a tuple" to be hashed (cache keys, idempotency keys).
/// Keys of all nested objects are sorted so that semantically identical
/// JSON values always serialize to the same bytes.
pub fn canonicalize_json(value: &serde_json::Value) -> String {
    fn sort(value: &serde_json::Value) -> serde_json::Value {
        match value {
            serde_json::Value::Object(map) => {
                let mut entries: Vec<(&String, &serde_json::Value)> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                let mut sorted = serde_json::Map::new();
                for (k, v) in entries {
                    sorted.insert(k.clone(), sort(v));
                }
                serde_json::Value::Object(sorted)
            }
            serde_json::Value::Array(items) => serde_json::Value::Array(items.iter().map(sort).collect()),
            other => other.clone(),
        }
    }
    serde_json::to_string(&sort(value)).expect("canonical JSON values are always serializable")
}

/// SHA-256 hex digest of the canonical JSON encoding of `value`.
pub fn canonical_hash(value: &serde_json::Value) -> String {
    use sha2::{Digest, Sha256};
    let canonical = canonicalize_json(value);
    let digest = Sha256::digest(canonical.as_bytes());
    format!("{digest:x}")
}
