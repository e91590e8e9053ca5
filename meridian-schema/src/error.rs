/// A single path-qualified schema failure, e.g. `properties.email: expected
/// type string, got number`.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("{path}: {message}")]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { path: path.into(), message: message.into() }
    }
}

/// Raised when a document fails validation against its collection's schema.
/// Never propagated to the graph driver (spec §4.K).
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("schema validation failed for collection {collection}: {}", errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
pub struct SchemaValidationError {
    pub collection: String,
    pub errors: Vec<FieldError>,
}
