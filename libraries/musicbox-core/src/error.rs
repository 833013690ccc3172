/// Core error types for MusicBox
use thiserror::Error;

use crate::types::UserId;

/// Result type alias using `MusicBoxError`
pub type Result<T> = std::result::Result<T, MusicBoxError>;

/// Core error type for MusicBox
#[derive(Error, Debug)]
pub enum MusicBoxError {
    /// Song player engine failed to start or seek
    #[error("Engine error: {0}")]
    Engine(String),

    /// Per-user configuration could not be loaded or saved
    #[error("Storage error: {0}")]
    Storage(String),

    /// The session was already destroyed
    #[error("Session closed for user {0}")]
    SessionClosed(UserId),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MusicBoxError {
    /// Create an engine error
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
