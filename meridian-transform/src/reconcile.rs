use serde_json::Value;
use sha2::{Digest, Sha256};

/// SHA-256 hex digest of raw content bytes. Content-hash equivalence is the
/// entire reconciliation strategy: no cross-connector semantic matching is
/// attempted (see DESIGN.md Open Question 2).
pub fn content_hash(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    format!("{digest:x}")
}

/// The diff between the previously stored blob metadata and what was just
/// observed, carried into [`crate::TransformContext`] (spec §4.H
/// "Reconciliation").
#[derive(Debug, Clone, Default)]
pub struct ReconciliationContext {
    pub previous_content_hash: Option<String>,
    pub previous_metadata: Option<Value>,
}

impl ReconciliationContext {
    pub fn new(previous_content_hash: Option<String>, previous_metadata: Option<Value>) -> Self {
        Self { previous_content_hash, previous_metadata }
    }

    /// True iff the newly observed content hash differs from what was
    /// previously stored (or nothing was previously stored).
    pub fn content_changed(&self, current_hash: &str) -> bool {
        match &self.previous_content_hash {
            Some(previous) => previous != current_hash,
            None => true,
        }
    }
}
