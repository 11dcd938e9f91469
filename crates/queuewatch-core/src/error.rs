use thiserror::Error;

/// Errors raised while polling the job API or loading configuration.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request failed with status {status}: {body}")]
    Request { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WatchError {
    /// HTTP status of a rejected request, if this error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            WatchError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for WatchError {
    fn from(e: serde_json::Error) -> Self {
        WatchError::Decode(e.to_string())
    }
}

/// Result type alias using WatchError.
pub type Result<T> = std::result::Result<T, WatchError>;
