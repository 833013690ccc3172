/// Host error types
use musicbox_core::MusicBoxError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HostError>;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid command: {0}")]
    Command(String),

    #[error("Unknown song: {0}")]
    UnknownSong(String),

    #[error("No session for user {0}")]
    NoSession(String),

    #[error(transparent)]
    Session(#[from] MusicBoxError),

    #[error("Input error: {0}")]
    Io(#[from] std::io::Error),
}

impl HostError {
    pub fn command(msg: impl Into<String>) -> Self {
        Self::Command(msg.into())
    }
}

impl From<config::ConfigError> for HostError {
    fn from(err: config::ConfigError) -> Self {
        HostError::Config(err.to_string())
    }
}
