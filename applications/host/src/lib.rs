//! MusicBox Host Library
//!
//! Console host for MusicBox sessions: configuration, logging collaborators,
//! and a line-based command interface driving a `SessionRegistry`.
//!
//! This library exposes the host components for testing purposes.

pub mod commands;
pub mod config;
pub mod console;
pub mod error;
pub mod host;

// Re-export commonly used types for convenience
pub use commands::Command;
pub use config::HostConfig;
pub use error::{HostError, Result};
pub use host::{MusicBoxHost, Outcome};
