#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("malformed event payload: {0}")]
    MalformedPayload(String),
    #[error("connector construction failed: {0}")]
    FactoryFailed(String),
    #[error("connector {0} is not initialized")]
    NotInitialized(String),
}

pub type Result<T> = std::result::Result<T, EventError>;
