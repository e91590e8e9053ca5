use meridian_core::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("config error: {0}")]
    Config(String),
    #[error("sync point store error: {0}")]
    SyncPoint(String),
    #[error("source error: {0}")]
    Source(String),
    #[error("transform error: {0}")]
    Transform(#[from] meridian_transform::TransformError),
    #[error("kv error: {0}")]
    Kv(#[from] meridian_kv::KvError),
    #[error("sync cancelled")]
    Cancelled,
}

impl ConnectorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConnectorError::Config(_) => ErrorKind::Contract,
            ConnectorError::SyncPoint(_) | ConnectorError::Source(_) | ConnectorError::Kv(_) => ErrorKind::Transient,
            ConnectorError::Transform(inner) => inner.kind(),
            ConnectorError::Cancelled => ErrorKind::Fatal,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConnectorError>;
