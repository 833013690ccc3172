//! Playback modes
//!
//! A mode owns one started song player engine bound to a single song. Radio
//! emits to the owner only, Speaker to everyone near the owner. Which one is
//! built is decided by the session's speaker flag; the mode itself never
//! negotiates it.

use musicbox_core::{Audience, ModeKind, MusicBoxSong, PlayerFactory, Result, SongPlayer, Tick, UserId};
use std::sync::Arc;
use tracing::debug;

/// A started engine plus the song it plays
///
/// The engine is stopped exactly once: by [`ModeHandle::destroy`], or on drop
/// if nobody destroyed it explicitly.
pub struct ModeHandle {
    song: Arc<MusicBoxSong>,
    audience: Audience,
    engine: Box<dyn SongPlayer>,
    stopped: bool,
}

impl ModeHandle {
    fn start(
        song: Arc<MusicBoxSong>,
        audience: Audience,
        players: &dyn PlayerFactory,
    ) -> Result<Self> {
        let mut engine = players.create(&audience)?;
        engine.start(&song)?;

        Ok(Self {
            song,
            audience,
            engine,
            stopped: false,
        })
    }

    fn destroy(&mut self) {
        if !self.stopped {
            self.engine.stop();
            self.stopped = true;
        }
    }
}

impl Drop for ModeHandle {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Active playback mode of a session
pub enum PlaybackMode {
    /// Private playback, audible only to the owner
    Radio(ModeHandle),

    /// Shared playback, audible to users near the owner
    Speaker(ModeHandle),
}

impl PlaybackMode {
    /// Create and start the engine for `kind`
    ///
    /// # Errors
    /// Returns the factory or engine error; nothing is left running on failure
    pub fn start(
        kind: ModeKind,
        song: Arc<MusicBoxSong>,
        owner: &UserId,
        speaker_radius: f64,
        players: &dyn PlayerFactory,
    ) -> Result<Self> {
        let mode = match kind {
            ModeKind::Radio => {
                let audience = Audience::Listener(owner.clone());
                PlaybackMode::Radio(ModeHandle::start(song, audience, players)?)
            }
            ModeKind::Speaker => {
                let audience = Audience::Nearby {
                    center: owner.clone(),
                    radius: speaker_radius,
                };
                PlaybackMode::Speaker(ModeHandle::start(song, audience, players)?)
            }
        };

        debug!("Started {:?} engine for {} ({})", kind, owner, mode.song().name);
        Ok(mode)
    }

    fn handle(&self) -> &ModeHandle {
        match self {
            PlaybackMode::Radio(handle) | PlaybackMode::Speaker(handle) => handle,
        }
    }

    fn handle_mut(&mut self) -> &mut ModeHandle {
        match self {
            PlaybackMode::Radio(handle) | PlaybackMode::Speaker(handle) => handle,
        }
    }

    pub fn kind(&self) -> ModeKind {
        match self {
            PlaybackMode::Radio(_) => ModeKind::Radio,
            PlaybackMode::Speaker(_) => ModeKind::Speaker,
        }
    }

    pub fn song(&self) -> &Arc<MusicBoxSong> {
        &self.handle().song
    }

    pub fn audience(&self) -> &Audience {
        &self.handle().audience
    }

    pub fn current_tick(&self) -> Tick {
        self.handle().engine.tick()
    }

    /// Move the engine to `tick`
    pub fn seek(&mut self, tick: Tick) {
        self.handle_mut().engine.set_tick(tick);
    }

    /// Advance the engine by one tick and return the tick reached
    pub fn advance(&mut self) -> Tick {
        let engine = &mut self.handle_mut().engine;
        let next = engine.tick().saturating_add(1);
        engine.set_tick(next);
        engine.tick()
    }

    pub fn is_finished(&self) -> bool {
        self.handle().engine.is_finished()
    }

    /// Stop the engine. Calling it again has no effect.
    pub fn destroy(&mut self) {
        self.handle_mut().destroy();
    }
}
