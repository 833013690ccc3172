//! Per-user playback session - core orchestration
//!
//! A session owns one user's speaker flag, at most one active playback mode,
//! the user's loaded configuration and an optional progress indicator.
//!
//! Every mutating operation holds the session mutex for its whole duration,
//! so replacing an engine (stop old, start new, seek) is one critical section
//! and no two engines of the same session are ever live together.

use crate::{
    indicator::Indicator,
    mode::PlaybackMode,
    registry::SessionMap,
    types::{PlaybackStatus, SessionSettings},
};
use musicbox_core::{
    ConfigStore, IndicatorFactory, ModeKind, MusicBoxError, MusicBoxSong, PermissionChecker,
    PlayerFactory, Result, Tick, UserConfig, UserId, SPEAKER_PERMISSION,
};
use parking_lot::{Mutex, MutexGuard};
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

/// Host collaborators shared by every session of a registry
pub struct SessionContext {
    pub players: Arc<dyn PlayerFactory>,
    pub indicators: Arc<dyn IndicatorFactory>,
    pub store: Arc<dyn ConfigStore>,
    pub permissions: Arc<dyn PermissionChecker>,
    pub settings: SessionSettings,
}

impl SessionContext {
    pub fn new(
        players: Arc<dyn PlayerFactory>,
        indicators: Arc<dyn IndicatorFactory>,
        store: Arc<dyn ConfigStore>,
        permissions: Arc<dyn PermissionChecker>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            players,
            indicators,
            store,
            permissions,
            settings,
        }
    }
}

struct SessionState {
    config: UserConfig,
    speaker: bool,
    active: Option<PlaybackMode>,
    indicator: Indicator,
    closed: bool,
}

impl SessionState {
    fn status(&self) -> PlaybackStatus {
        self.active
            .as_ref()
            .map_or(PlaybackStatus::Idle, |mode| PlaybackStatus::playing(mode.kind()))
    }

    /// Stop and drop the active mode, if any
    fn release_active(&mut self) {
        if let Some(mut mode) = self.active.take() {
            mode.destroy();
        }
    }
}

/// Playback state of one connected user
///
/// Created through [`crate::SessionRegistry::get_or_create`] and shared as
/// `Arc<PlaybackSession>` with whichever host thread needs it. Once
/// [`destroy`](Self::destroy) ran, every mutating call fails with
/// [`MusicBoxError::SessionClosed`] and no engine can be started again.
pub struct PlaybackSession {
    user: UserId,
    context: Arc<SessionContext>,
    registry: Weak<SessionMap>,
    state: Mutex<SessionState>,
}

impl PlaybackSession {
    /// Load the user's configuration and attach a hidden indicator
    ///
    /// # Errors
    /// Returns the store error if the configuration cannot be loaded
    pub(crate) fn open(
        user: UserId,
        context: Arc<SessionContext>,
        registry: Weak<SessionMap>,
    ) -> Result<Self> {
        let config = context.store.load(&user)?;

        let indicator = if context.settings.indicator_enabled {
            let inner = context
                .indicators
                .create(&context.settings.indicator_style);
            Indicator::attached(inner, &user)
        } else {
            Indicator::disabled()
        };

        info!("Opened playback session for {}", user);

        Ok(Self {
            user,
            context,
            registry,
            state: Mutex::new(SessionState {
                config,
                speaker: false,
                active: None,
                indicator,
                closed: false,
            }),
        })
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    fn lock_open(&self) -> Result<MutexGuard<'_, SessionState>> {
        let state = self.state.lock();
        if state.closed {
            return Err(MusicBoxError::SessionClosed(self.user.clone()));
        }
        Ok(state)
    }

    // ===== Playback =====

    /// Play `song` in the mode selected by the speaker flag
    ///
    /// Any active mode is stopped first. With `Some(tick)` the new engine is
    /// moved to `tick` right after it started; with `None` it plays from the
    /// beginning.
    ///
    /// # Errors
    /// - `SessionClosed` if the session was destroyed
    /// - the factory or engine error if the new engine cannot start; the
    ///   session is left idle
    pub fn play(&self, song: Arc<MusicBoxSong>, start_tick: Option<Tick>) -> Result<PlaybackStatus> {
        let mut state = self.lock_open()?;
        self.play_locked(&mut state, song, start_tick)
    }

    /// Play `song` from its first tick
    pub fn play_from_start(&self, song: Arc<MusicBoxSong>) -> Result<PlaybackStatus> {
        self.play(song, None)
    }

    fn play_locked(
        &self,
        state: &mut SessionState,
        song: Arc<MusicBoxSong>,
        start_tick: Option<Tick>,
    ) -> Result<PlaybackStatus> {
        state.release_active();

        let kind = ModeKind::from_speaker_flag(state.speaker);
        let mut mode = match PlaybackMode::start(
            kind,
            song,
            &self.user,
            self.context.settings.speaker_radius,
            self.context.players.as_ref(),
        ) {
            Ok(mode) => mode,
            Err(e) => {
                warn!("Failed to start {:?} playback for {}: {}", kind, self.user, e);
                state.indicator.hide();
                return Err(e);
            }
        };

        if let Some(tick) = start_tick {
            mode.seek(tick);
        }

        let progress = mode.song().progress_at(mode.current_tick());
        state.indicator.show(&mode.song().name, progress);
        state.active = Some(mode);

        Ok(state.status())
    }

    /// Stop the active mode, if any, and hide the indicator
    pub fn stop_play(&self) {
        let mut state = self.state.lock();
        if state.active.is_some() {
            debug!("Stopping playback for {}", self.user);
        }
        state.release_active();
        state.indicator.hide();
    }

    /// Advance the active engine by one host tick
    ///
    /// Refreshes the indicator and releases the mode once its engine reports
    /// the end of the song. Returns the tick reached, or `None` when idle or
    /// closed.
    pub fn advance(&self) -> Option<Tick> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let mode = state.active.as_mut()?;

        let tick = mode.advance();
        state.indicator.set_progress(mode.song().progress_at(tick));

        if mode.is_finished() {
            debug!("{} finished for {}", mode.song().name, self.user);
            state.release_active();
            state.indicator.hide();
        }

        Some(tick)
    }

    // ===== Modes =====

    /// Flip between radio and speaker mode
    ///
    /// A playing song keeps playing in the new mode from the exact tick it
    /// had reached. Returns the resulting status.
    ///
    /// # Errors
    /// - `SessionClosed` if the session was destroyed
    /// - the engine error if the new mode cannot start; the flag stays
    ///   flipped and the session is left idle
    pub fn switch_mode(&self) -> Result<PlaybackStatus> {
        let mut state = self.lock_open()?;
        self.switch_locked(&mut state)
    }

    /// Like [`switch_mode`](Self::switch_mode), but only if the user may use
    /// speaker mode
    ///
    /// Leaving speaker mode is always allowed. Returns `Ok(false)` without
    /// touching the session when the switch is denied.
    pub fn switch_mode_checked(&self) -> Result<bool> {
        let mut state = self.lock_open()?;
        if !state.speaker && !self.can_switch_mode() {
            debug!("Speaker mode denied for {}", self.user);
            return Ok(false);
        }
        self.switch_locked(&mut state)?;
        Ok(true)
    }

    fn switch_locked(&self, state: &mut SessionState) -> Result<PlaybackStatus> {
        state.speaker = !state.speaker;
        debug!(
            "{} switched to {:?}",
            self.user,
            ModeKind::from_speaker_flag(state.speaker)
        );

        let resume = state
            .active
            .as_ref()
            .map(|mode| (Arc::clone(mode.song()), mode.current_tick()));

        match resume {
            Some((song, tick)) => self.play_locked(state, song, Some(tick)),
            None => Ok(state.status()),
        }
    }

    /// Whether the user holds the speaker mode permission
    pub fn can_switch_mode(&self) -> bool {
        self.context
            .permissions
            .has_permission(&self.user, SPEAKER_PERMISSION)
    }

    // ===== Teardown =====

    /// Stop playback, detach the indicator, persist the configuration and
    /// remove the session from its registry
    ///
    /// Only this exact session is unregistered; a newer session of the same
    /// user is left alone. The session is closed even if saving fails. A
    /// second call does nothing.
    ///
    /// # Errors
    /// Returns the store error if the configuration cannot be saved
    pub fn destroy(&self) -> Result<()> {
        let Some(sessions) = self.registry.upgrade() else {
            return self.close();
        };

        let mut sessions = sessions.write();
        let registered = sessions
            .get(&self.user)
            .is_some_and(|entry| std::ptr::eq(Arc::as_ptr(entry), self));
        let _entry = if registered {
            sessions.remove(&self.user)
        } else {
            None
        };

        self.close()
    }

    /// Tear the session down; the caller handles registry bookkeeping
    pub(crate) fn close(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Ok(());
        }
        state.closed = true;

        state.release_active();
        state.indicator.detach();

        self.context.store.save(&self.user, &state.config)?;
        info!("Closed playback session for {}", self.user);
        Ok(())
    }

    // ===== Indicator =====

    pub fn set_indicator_visible(&self, visible: bool) {
        self.state.lock().indicator.set_visible(visible);
    }

    pub fn set_indicator_title(&self, title: &str) {
        self.state.lock().indicator.set_title(title);
    }

    pub fn set_indicator_progress(&self, progress: f64) {
        self.state.lock().indicator.set_progress(progress);
    }

    pub fn has_indicator(&self) -> bool {
        self.state.lock().indicator.is_enabled()
    }

    // ===== Queries =====

    pub fn is_playing(&self) -> bool {
        self.state.lock().active.is_some()
    }

    pub fn is_speaker(&self) -> bool {
        self.state.lock().speaker
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn status(&self) -> PlaybackStatus {
        self.state.lock().status()
    }

    /// Song of the active mode
    pub fn current_song(&self) -> Option<Arc<MusicBoxSong>> {
        self.state
            .lock()
            .active
            .as_ref()
            .map(|mode| Arc::clone(mode.song()))
    }

    /// Tick of the active mode
    pub fn current_tick(&self) -> Option<Tick> {
        self.state.lock().active.as_ref().map(PlaybackMode::current_tick)
    }

    pub fn with_config<R>(&self, f: impl FnOnce(&UserConfig) -> R) -> R {
        f(&self.state.lock().config)
    }

    /// Mutate the configuration that is saved on destroy
    ///
    /// # Errors
    /// Returns `SessionClosed` once the configuration was already saved
    pub fn with_config_mut<R>(&self, f: impl FnOnce(&mut UserConfig) -> R) -> Result<R> {
        let mut state = self.lock_open()?;
        Ok(f(&mut state.config))
    }
}

impl std::fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("PlaybackSession")
            .field("user", &self.user)
            .field("speaker", &state.speaker)
            .field("status", &state.status())
            .field("closed", &state.closed)
            .finish()
    }
}
