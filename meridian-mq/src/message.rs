use serde::{Deserialize, Serialize};

/// Inbound/outbound envelope: `{ event_type, payload }`, optionally keyed
/// where partitioning matters (`orgId` per spec).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub event_type: String,
    pub payload: serde_json::Value,
    pub key: Option<String>,
}

impl Message {
    pub fn new(event_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self { event_type: event_type.into(), payload, key: None }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}
