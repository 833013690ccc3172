//! MusicBox Storage
//!
//! Per-user configuration persistence for MusicBox.
//!
//! Every user gets one JSON record in a players folder, named after the
//! user's stable id (`<players_folder>/<user-id>.json`). A user without a
//! record loads an empty configuration.
//!
//! # Example
//!
//! ```rust,no_run
//! use musicbox_core::{ConfigStore, UserId};
//! use musicbox_storage::FileConfigStore;
//!
//! # fn example() -> musicbox_core::Result<()> {
//! let store = FileConfigStore::new("./data/players");
//! let user = UserId::new("069a79f4-44e9-4726-a5be-fca90e38aaf5");
//!
//! let mut config = store.load(&user)?;
//! config.set("volume", 80);
//! store.save(&user, &config)?;
//! # Ok(())
//! # }
//! ```

mod error;

pub mod players;

pub use error::{Result, StorageError};
pub use players::FileConfigStore;
