use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Usage(String),

    #[error("{0}")]
    Classification(String),

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Shutdown request failed: {0}")]
    Power(String),
}

impl ToolsError {
    /// Usage and classification errors end the run before any batch work
    /// and are shown to the user as a single line.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, ToolsError::Usage(_) | ToolsError::Classification(_))
    }
}

pub type Result<T> = std::result::Result<T, ToolsError>;
