use meridian_core::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("language model call failed: {0}")]
    Llm(String),
    #[error("retrieval failed: {0}")]
    Retrieval(String),
    #[error("user info lookup failed: {0}")]
    UserInfo(String),
    #[error("agent loop cancelled")]
    Cancelled,
}

impl AgentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AgentError::Llm(_) => ErrorKind::Transient,
            AgentError::Retrieval(_) => ErrorKind::Transient,
            AgentError::UserInfo(_) => ErrorKind::Transient,
            AgentError::Cancelled => ErrorKind::Fatal,
        }
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;
