//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
///
/// `Request` and `Batch` display the backend's message verbatim so callers
/// can surface it to users unchanged.
#[derive(Error, Debug)]
pub enum Error {
    /// The backend answered with `success: false`
    #[error("{0}")]
    Request(String),

    /// A batch write reported a failed entry
    #[error("{0}")]
    Batch(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a backend request error
    pub fn request(msg: impl Into<String>) -> Self {
        Self::Request(msg.into())
    }

    /// Create a batch entry error
    pub fn batch(msg: impl Into<String>) -> Self {
        Self::Batch(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True when the backend itself rejected the call (as opposed to the
    /// call never reaching it)
    pub fn is_backend_rejection(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Batch(_))
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
