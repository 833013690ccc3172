//! MusicBox Core
//!
//! Host-agnostic types, traits, and error handling shared by the MusicBox
//! session core, its storage backend and the host application.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `UserId`, `MusicBoxSong`, `UserConfig`, `Audience`
//! - **Collaborator Traits**: `SongPlayer`, `PlayerFactory`, `ProgressIndicator`,
//!   `IndicatorFactory`, `ConfigStore`, `PermissionChecker`
//! - **Error Handling**: Unified `MusicBoxError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use musicbox_core::types::{MusicBoxSong, UserConfig, UserId};
//!
//! let user = UserId::generate();
//! let song = MusicBoxSong::new("lullaby", "Lullaby", 640);
//!
//! let mut config = UserConfig::default();
//! config.set("last_song", song.id.as_str());
//! assert_eq!(config.get::<String>("last_song").as_deref(), Some("lullaby"));
//! # let _ = user;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{MusicBoxError, Result};
pub use traits::{
    ConfigStore, IndicatorFactory, PermissionChecker, PlayerFactory, ProgressIndicator, SongPlayer,
    SPEAKER_PERMISSION,
};
pub use types::{
    Audience, BarColor, BarStyle, IndicatorStyle, ModeKind, MusicBoxSong, SongId, Tick, UserConfig,
    UserId,
};
