use crate::ids::{ExternalId, OrgKey, RecordKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The content type carried by a [`Record`]. Mirrors the type tags used by
/// the original connector fleet (Drive files, Gmail threads, Slack/Jira/
/// Confluence artifacts, SQL-backed sources, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    File,
    Mail,
    Link,
    Page,
    Webpage,
    Comment,
    Ticket,
    Project,
    SqlTable,
    SqlView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordOrigin {
    Connector,
    Upload,
}

/// Monotonic progress: NOT_STARTED -> IN_PROGRESS -> {COMPLETED, FAILED, AUTO_INDEX_OFF}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IndexingStatus {
    NotStarted,
    InProgress,
    Completed,
    Failed,
    AutoIndexOff,
}

impl IndexingStatus {
    /// Returns true if `next` is a legal successor of `self` under the
    /// monotonic-progress invariant (spec.md Invariant 2).
    pub fn can_transition_to(self, next: IndexingStatus) -> bool {
        use IndexingStatus::*;
        match (self, next) {
            (NotStarted, InProgress) => true,
            (InProgress, Completed | Failed | AutoIndexOff) => true,
            (a, b) if a == b => true,
            _ => false,
        }
    }
}

/// The central content entity. See spec §3 "Record".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub record_key: RecordKey,
    pub org_key: OrgKey,
    pub external_id: ExternalId,
    pub record_type: RecordType,
    pub origin: RecordOrigin,
    pub connector_name: String,
    pub source_created_at: Option<DateTime<Utc>>,
    pub source_modified_at: Option<DateTime<Utc>>,
    pub web_url: Option<String>,
    pub mime_type: Option<String>,
    pub external_revision_id: Option<String>,
    pub indexing_status: IndexingStatus,
    pub extraction_status: IndexingStatus,
    /// Groups records that share identical content across sources.
    pub virtual_record_id: Option<String>,
}

impl Record {
    pub fn new(
        record_key: impl Into<String>,
        org_key: impl Into<String>,
        external_id: impl Into<String>,
        record_type: RecordType,
        connector_name: impl Into<String>,
    ) -> Self {
        Self {
            record_key: RecordKey::from(record_key.into()),
            org_key: OrgKey::from(org_key.into()),
            external_id: ExternalId::from(external_id.into()),
            record_type,
            origin: RecordOrigin::Connector,
            connector_name: connector_name.into(),
            source_created_at: None,
            source_modified_at: None,
            web_url: None,
            mime_type: None,
            external_revision_id: None,
            indexing_status: IndexingStatus::NotStarted,
            extraction_status: IndexingStatus::NotStarted,
            virtual_record_id: None,
        }
    }

    /// Apply an indexing-status transition, rejecting illegal regressions.
    pub fn set_indexing_status(&mut self, next: IndexingStatus) -> Result<(), String> {
        if !self.indexing_status.can_transition_to(next) {
            return Err(format!(
                "illegal indexing status transition {:?} -> {:?} for record {}",
                self.indexing_status, next, self.record_key
            ));
        }
        self.indexing_status = next;
        Ok(())
    }

    /// Whether this record should be re-indexed: COMPLETED records are
    /// skipped unless the external revision id changed (spec Invariant 2).
    pub fn needs_reindex(&self, observed_revision: Option<&str>) -> bool {
        if self.indexing_status != IndexingStatus::Completed {
            return true;
        }
        match (&self.external_revision_id, observed_revision) {
            (Some(stored), Some(observed)) => stored != observed,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

/// A content checksum tuple carried by [`FileRecord`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileChecksums {
    pub quick_xor_hash: Option<String>,
    pub crc32: Option<String>,
    pub md5: Option<String>,
    pub sha1: Option<String>,
    pub sha256: Option<String>,
}

/// Subtype attributes attached to a `Record` with `record_type == File`.
/// Exactly one `FileRecord` relates to one `Record` via an `is_of_type` edge
/// (spec Invariant 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub record_key: RecordKey,
    pub name: String,
    pub extension: Option<String>,
    pub mime_type: Option<String>,
    pub size_bytes: u64,
    pub path: Option<String>,
    pub etag: Option<String>,
    pub ctag: Option<String>,
    pub checksums: FileChecksums,
}

/// The `is_of_type` edge linking a `Record` to its `FileRecord`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsOfTypeEdge {
    pub record_key: RecordKey,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A `Record` + `FileRecord` + edge, created atomically per spec Invariant 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecordBundle {
    pub record: Record,
    pub file_record: FileRecord,
    pub edge: IsOfTypeEdge,
}

impl FileRecordBundle {
    pub fn new(record: Record, file_record: FileRecord) -> Self {
        debug_assert_eq!(record.record_type, RecordType::File);
        let now = Utc::now();
        let edge = IsOfTypeEdge { record_key: record.record_key.clone(), created_at: now, updated_at: now };
        Self { record, file_record, edge }
    }
}
