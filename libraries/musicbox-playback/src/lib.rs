//! MusicBox - Playback Sessions
//!
//! Per-user playback sessions for a shared multi-user host (a game server).
//!
//! This crate provides:
//! - Radio and speaker playback modes over a host song player engine
//! - Seamless mode switching (the song resumes at the tick it had reached)
//! - At most one live engine per session, under any interleaving of host threads
//! - An optional progress indicator behind a uniform interface
//! - A registry tying session lifetime to user connection lifetime
//!
//! # Architecture
//!
//! `musicbox-playback` knows nothing about the host:
//! - Engines come from a `PlayerFactory`
//! - Indicators come from an `IndicatorFactory`
//! - Configuration goes through a `ConfigStore`
//! - Permissions are answered by a `PermissionChecker`
//!
//! The host implements those traits (see `musicbox-core`) and forwards its
//! connect, disconnect, command and tick events to the [`SessionRegistry`].
//!
//! # Example
//!
//! ```rust,no_run
//! use musicbox_core::{MusicBoxSong, UserId};
//! use musicbox_playback::{SessionContext, SessionRegistry};
//! use std::sync::Arc;
//!
//! # fn example(context: SessionContext) -> musicbox_core::Result<()> {
//! let registry = SessionRegistry::new(context);
//! let user = UserId::new("steve");
//!
//! let session = registry.get_or_create(&user)?;
//! session.play_from_start(Arc::new(MusicBoxSong::new("tetris", "Tetris", 1200)))?;
//!
//! // Later, on a host tick
//! registry.advance_all();
//!
//! // Keep the song going for everyone nearby
//! session.switch_mode_checked()?;
//!
//! // The user left
//! registry.disconnect(&user)?;
//! # Ok(())
//! # }
//! ```

mod indicator;
mod mode;
mod registry;
mod session;
pub mod types;

// Public exports
pub use indicator::Indicator;
pub use mode::{ModeHandle, PlaybackMode};
pub use registry::SessionRegistry;
pub use session::{PlaybackSession, SessionContext};
pub use types::{PlaybackStatus, SessionSettings};
