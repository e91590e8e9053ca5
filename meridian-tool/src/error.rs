use meridian_core::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("tool '{0}' is already registered")]
    AlreadyRegistered(String),
    #[error("tool '{0}' not found")]
    NotFound(String),
    #[error("required parameter '{0}' not provided")]
    MissingParameter(String),
    #[error("tool execution failed: {0}")]
    Execution(String),
}

impl ToolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolError::AlreadyRegistered(_) => ErrorKind::Contract,
            ToolError::NotFound(_) => ErrorKind::Contract,
            ToolError::MissingParameter(_) => ErrorKind::Validation,
            ToolError::Execution(_) => ErrorKind::Transient,
        }
    }
}

pub type Result<T> = std::result::Result<T, ToolError>;
