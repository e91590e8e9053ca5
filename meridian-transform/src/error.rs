use meridian_core::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("blob store error: {0}")]
    Blob(String),
    #[error("vector store error: {0}")]
    Vector(String),
    #[error("graph store error: {0}")]
    Graph(String),
    #[error("schema validation error: {0}")]
    Schema(#[from] meridian_schema::SchemaValidationError),
    #[error("malformed transform context: {0}")]
    Contract(String),
}

impl TransformError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransformError::Blob(_) | TransformError::Vector(_) | TransformError::Graph(_) => ErrorKind::Transient,
            TransformError::Schema(_) => ErrorKind::Validation,
            TransformError::Contract(_) => ErrorKind::Contract,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;
