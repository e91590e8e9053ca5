use meridian_core::ErrorKind;

#[derive(Debug, Clone, thiserror::Error)]
pub enum KvError {
    #[error("kv store is not connected")]
    NotConnected,
    #[error("key not found: {0}")]
    NotFound(String),
    #[error("backend error: {0}")]
    Backend(String),
    #[error("encryption error: {0}")]
    Crypto(String),
}

impl KvError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            KvError::NotConnected => ErrorKind::Transient,
            KvError::NotFound(_) => ErrorKind::Contract,
            KvError::Backend(_) => ErrorKind::Transient,
            KvError::Crypto(_) => ErrorKind::Fatal,
        }
    }
}

pub type Result<T> = std::result::Result<T, KvError>;
