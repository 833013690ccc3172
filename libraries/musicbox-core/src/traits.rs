/// Collaborator traits for MusicBox
///
/// The session core drives these seams; the host environment implements them.
use crate::error::Result;
use crate::types::{Audience, IndicatorStyle, MusicBoxSong, Tick, UserConfig, UserId};

/// Permission a user needs to switch into speaker mode
pub const SPEAKER_PERMISSION: &str = "musicbox.speaker";

/// Tick-driven song player engine
///
/// Implementers schedule the notes of one composition and emit them to the
/// audience they were created for. An engine is owned by exactly one playback
/// mode and is never shared between sessions.
pub trait SongPlayer: Send {
    /// Start playing `song` from tick 0
    ///
    /// # Errors
    /// Returns an error if the engine cannot start rendering the song
    fn start(&mut self, song: &MusicBoxSong) -> Result<()>;

    /// Stop emitting sound. Must be effective immediately.
    fn stop(&mut self);

    /// Move playback to `tick`
    fn set_tick(&mut self, tick: Tick);

    /// Current playback tick
    fn tick(&self) -> Tick;

    /// Whether the engine reached the end of its song
    fn is_finished(&self) -> bool {
        false
    }
}

/// Creates song player engines bound to an audience
pub trait PlayerFactory: Send + Sync {
    /// Create an engine that emits to `audience`
    ///
    /// # Errors
    /// Returns an error if no engine can be created for the audience
    fn create(&self, audience: &Audience) -> Result<Box<dyn SongPlayer>>;
}

/// Visual progress surface attached to a user (a boss bar on the host)
pub trait ProgressIndicator: Send {
    fn set_visible(&mut self, visible: bool);

    fn set_title(&mut self, title: &str);

    /// Set progress, in `[0, 1]`
    fn set_progress(&mut self, progress: f64);

    /// Show the indicator to `user`
    fn attach(&mut self, user: &UserId);

    /// Remove the indicator from `user`'s view
    fn detach(&mut self, user: &UserId);
}

/// Creates progress indicators
pub trait IndicatorFactory: Send + Sync {
    fn create(&self, style: &IndicatorStyle) -> Box<dyn ProgressIndicator>;
}

/// Per-user configuration persistence
///
/// Records are addressed by the stable user identifier; the format and
/// location are up to the implementer.
pub trait ConfigStore: Send + Sync {
    /// Load the configuration of `user`; a user without a record gets an
    /// empty configuration
    ///
    /// # Errors
    /// Returns an error if an existing record cannot be read
    fn load(&self, user: &UserId) -> Result<UserConfig>;

    /// Persist the configuration of `user`
    ///
    /// # Errors
    /// Returns an error if the record cannot be written
    fn save(&self, user: &UserId, config: &UserConfig) -> Result<()>;
}

/// Host permission lookup
pub trait PermissionChecker: Send + Sync {
    fn has_permission(&self, user: &UserId, permission: &str) -> bool;
}
