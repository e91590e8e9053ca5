//! Typed views over the KV-store config paths named in spec §6.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Stored at `/services/connectors/{type}/config`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    pub connector_type: String,
    pub app_group: String,
    pub auth_type: String,
    pub auth_config: serde_json::Value,
    pub credentials: CredentialRecord,
    pub filters: HashMap<String, serde_json::Value>,
}

/// `{ access_token, refresh_token?, access_token_expiry_time?, ... }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialRecord {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub access_token_expiry_time: Option<i64>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Stored at `/services/toolsets/{userId}/{instanceId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsetInstanceConfig {
    pub user_id: String,
    pub instance_id: String,
    pub toolset_type: String,
    pub credentials: CredentialRecord,
}

/// Stored at `/services/oauths/toolsets/{type}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthAppConfig {
    pub toolset_type: String,
    pub client_id: String,
    pub client_secret: String,
    pub scopes: Vec<String>,
    pub token_endpoint: String,
}

/// `/services/endpoints`, `/services/secretKeys`, `/services/storage`,
/// `/services/kafka`, `/services/redis`, `/services/arangodb|neo4j`,
/// `/services/qdrant`, `/services/aiModels`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InfraEndpoints {
    pub endpoints: HashMap<String, String>,
    pub secret_keys: HashMap<String, String>,
    pub storage: HashMap<String, String>,
    pub kafka_brokers: Vec<String>,
    pub redis_url: Option<String>,
    pub graph_db_url: Option<String>,
    pub vector_db_url: Option<String>,
    pub ai_models: HashMap<String, String>,
}

pub mod kv_paths {
    pub fn connector_config(connector_type: &str) -> String {
        format!("/services/connectors/{connector_type}/config")
    }

    pub fn toolset_instance(user_id: &str, instance_id: &str) -> String {
        format!("/services/toolsets/{user_id}/{instance_id}")
    }

    pub fn oauth_app_config(toolset_type: &str) -> String {
        format!("/services/oauths/toolsets/{toolset_type}")
    }

    pub fn sync_point(connector_id: &str) -> String {
        format!("/services/syncpoints/{connector_id}")
    }
}
