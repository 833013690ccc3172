/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// The user id cannot be used as a file name
    #[error("Invalid user id for storage: {0:?}")]
    InvalidUserId(String),

    /// A record exists but does not hold a configuration
    #[error("Corrupt record {path}: {reason}")]
    Corrupt { path: String, reason: String },

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Create a corrupt record error
    pub fn corrupt(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<StorageError> for musicbox_core::MusicBoxError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidUserId(id) => {
                musicbox_core::MusicBoxError::invalid_input(format!("user id {:?}", id))
            }
            other => musicbox_core::MusicBoxError::storage(other.to_string()),
        }
    }
}
