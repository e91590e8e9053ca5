use serde::{Deserialize, Serialize};

/// The five error kinds named in spec §7, used by every crate's own
/// `thiserror` enum to classify how the caller should react.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Network, 5xx, 429, rate-limit, timeout. Safe to retry with backoff.
    Transient,
    /// 401/403, revoked credentials. Never retried.
    Permission,
    /// Schema validation failure. Rejected at the boundary.
    Validation,
    /// Missing required inputs. Immediate error to caller.
    Contract,
    /// Unrecoverable state. Record-level fatal continues the sync;
    /// process-level fatal terminates the worker.
    Fatal,
}

impl ErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Transient)
    }
}

/// The error taxonomy surfaced to external callers (spec §6).
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize)]
pub enum IndexingError {
    #[error("indexing error: {message}")]
    Indexing { message: String, record_id: Option<String>, details: Option<String> },
    #[error("document processing error: {message}")]
    DocumentProcessing { message: String, record_id: Option<String>, details: Option<String> },
    #[error("embedding error: {message}")]
    Embedding { message: String, record_id: Option<String>, details: Option<String> },
    #[error("vector store error: {message}")]
    VectorStore { message: String, record_id: Option<String>, details: Option<String> },
    #[error("chunking error: {message}")]
    Chunking { message: String, record_id: Option<String>, details: Option<String> },
    #[error("extraction error: {message}")]
    Extraction { message: String, record_id: Option<String>, details: Option<String> },
    #[error("schema validation error: {message}")]
    SchemaValidation { message: String, record_id: Option<String>, details: Option<String> },
}

impl IndexingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IndexingError::SchemaValidation { .. } => ErrorKind::Validation,
            _ => ErrorKind::Fatal,
        }
    }
}

/// Per-record sync report aggregation (spec §7 "user-visible behavior").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    pub total: u64,
    pub processed: u64,
    pub failed: u64,
    pub status: SyncStatus,
    pub failures: Vec<RecordFailure>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    #[default]
    Running,
    Completed,
    CompletedWithErrors,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordFailure {
    pub record_id: String,
    pub message: String,
}

impl SyncReport {
    pub fn record_success(&mut self) {
        self.total += 1;
        self.processed += 1;
    }

    pub fn record_failure(&mut self, record_id: impl Into<String>, message: impl Into<String>) {
        self.total += 1;
        self.failed += 1;
        self.failures.push(RecordFailure { record_id: record_id.into(), message: message.into() });
    }

    pub fn finalize(&mut self, status: SyncStatus) {
        self.status = status;
    }
}
