use meridian_core::ErrorKind;

#[derive(Debug, Clone, thiserror::Error)]
pub enum MqError {
    #[error("topic closed: {0}")]
    TopicClosed(String),
    #[error("broker error: {0}")]
    Broker(String),
}

impl MqError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Transient
    }
}

pub type Result<T> = std::result::Result<T, MqError>;
