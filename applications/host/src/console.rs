//! Console implementations of the session collaborators
//!
//! The console host has no world to render into, so engines and indicators
//! report what they would do through `tracing`.

use musicbox_core::{
    Audience, IndicatorFactory, IndicatorStyle, MusicBoxSong, PermissionChecker, PlayerFactory,
    ProgressIndicator, Result, SongPlayer, Tick, UserId, SPEAKER_PERMISSION,
};
use std::collections::HashSet;
use tracing::{debug, info, trace};

/// Engine that logs the notes it would emit
#[derive(Debug)]
pub struct ConsolePlayer {
    audience: Audience,
    song: Option<String>,
    tick: Tick,
    length: Tick,
}

impl ConsolePlayer {
    pub fn new(audience: Audience) -> Self {
        Self {
            audience,
            song: None,
            tick: 0,
            length: 0,
        }
    }
}

impl SongPlayer for ConsolePlayer {
    fn start(&mut self, song: &MusicBoxSong) -> Result<()> {
        info!(
            "♪ {} starts for {:?} ({} ticks at {} t/s)",
            song.name, self.audience, song.length, song.speed
        );
        self.song = Some(song.name.clone());
        self.length = song.length;
        self.tick = 0;
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(song) = self.song.take() {
            info!("♪ {} stopped at tick {}/{}", song, self.tick, self.length);
        }
    }

    fn set_tick(&mut self, tick: Tick) {
        if self.song.is_some() {
            trace!("tick {} for {:?}", tick, self.audience);
        }
        self.tick = tick;
    }

    fn tick(&self) -> Tick {
        self.tick
    }

    fn is_finished(&self) -> bool {
        self.tick >= self.length
    }
}

/// Creates a `ConsolePlayer` per mode
#[derive(Debug, Default)]
pub struct ConsolePlayerFactory;

impl PlayerFactory for ConsolePlayerFactory {
    fn create(&self, audience: &Audience) -> Result<Box<dyn SongPlayer>> {
        Ok(Box::new(ConsolePlayer::new(audience.clone())))
    }
}

/// Indicator that logs title and progress changes
#[derive(Debug)]
pub struct ConsoleIndicator {
    style: IndicatorStyle,
    user: Option<UserId>,
    visible: bool,
    title: String,
    /// Last logged progress, in whole percent
    percent: u8,
}

impl ProgressIndicator for ConsoleIndicator {
    fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            if let Some(user) = &self.user {
                debug!("[{:?}] bar of {} visible={}", self.style.color, user, visible);
            }
        }
    }

    fn set_title(&mut self, title: &str) {
        if self.title != title {
            self.title = title.to_string();
            debug!("[{:?}] bar title: {}", self.style.color, title);
        }
    }

    fn set_progress(&mut self, progress: f64) {
        let percent = (progress.clamp(0.0, 1.0) * 100.0).round() as u8;
        // One line per ten percent is plenty on a console
        if self.visible && percent / 10 != self.percent / 10 {
            debug!("[{:?}] {}: {}%", self.style.color, self.title, percent);
        }
        self.percent = percent;
    }

    fn attach(&mut self, user: &UserId) {
        self.user = Some(user.clone());
    }

    fn detach(&mut self, user: &UserId) {
        if self.user.as_ref() == Some(user) {
            self.user = None;
        }
    }
}

/// Creates hidden `ConsoleIndicator`s
#[derive(Debug, Default)]
pub struct ConsoleIndicatorFactory;

impl IndicatorFactory for ConsoleIndicatorFactory {
    fn create(&self, style: &IndicatorStyle) -> Box<dyn ProgressIndicator> {
        Box::new(ConsoleIndicator {
            style: *style,
            user: None,
            visible: false,
            title: String::new(),
            percent: 0,
        })
    }
}

/// Grants the speaker permission to a fixed set of users
#[derive(Debug, Default)]
pub struct ConfiguredPermissions {
    speakers: HashSet<UserId>,
}

impl ConfiguredPermissions {
    pub fn new(speakers: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            speakers: speakers.into_iter().collect(),
        }
    }
}

impl PermissionChecker for ConfiguredPermissions {
    fn has_permission(&self, user: &UserId, permission: &str) -> bool {
        permission == SPEAKER_PERMISSION && self.speakers.contains(user)
    }
}
