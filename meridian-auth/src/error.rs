use meridian_core::ErrorKind;

#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("unknown credential: {0}")]
    UnknownCredential(String),
    #[error("refresh failed: {0}")]
    RefreshFailed(String),
    #[error("kv store error: {0}")]
    Kv(String),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::UnknownCredential(_) => ErrorKind::Contract,
            AuthError::RefreshFailed(_) => ErrorKind::Transient,
            AuthError::Kv(_) => ErrorKind::Transient,
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
