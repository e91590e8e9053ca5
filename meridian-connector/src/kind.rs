use serde::{Deserialize, Serialize};

/// The source families named in spec §1. Connectors are metadata-only in
/// this crate: no live third-party SDK call surfaces are implemented here
/// (spec §1 explicitly places those "deliberately out of scope").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorKind {
    Drive,
    Gmail,
    Slack,
    Jira,
    Confluence,
    Dropbox,
    GitHub,
    SharePoint,
    S3,
    Database,
}

impl ConnectorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectorKind::Drive => "drive",
            ConnectorKind::Gmail => "gmail",
            ConnectorKind::Slack => "slack",
            ConnectorKind::Jira => "jira",
            ConnectorKind::Confluence => "confluence",
            ConnectorKind::Dropbox => "dropbox",
            ConnectorKind::GitHub => "github",
            ConnectorKind::SharePoint => "sharepoint",
            ConnectorKind::S3 => "s3",
            ConnectorKind::Database => "database",
        }
    }
}
