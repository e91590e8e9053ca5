use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PermissionRole {
    Reader,
    Writer,
    Owner,
    Commenter,
    Others,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrincipalEntityType {
    User,
    Group,
    Role,
    Domain,
    Org,
    Team,
    Anyone,
    AnyoneWithLink,
}

/// Modeled as an edge between a principal node and a resource node (spec §3
/// "Permission").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub external_id: Option<String>,
    pub email: Option<String>,
    pub role: PermissionRole,
    pub entity_type: PrincipalEntityType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
