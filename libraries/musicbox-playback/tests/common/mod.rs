//! Instrumented host collaborators for session tests
//!
//! Engines count how many of them are live at once, indicators record what
//! was shown, and the store keeps configurations in memory.

#![allow(dead_code)]

use musicbox_core::{
    Audience, ConfigStore, IndicatorFactory, IndicatorStyle, MusicBoxError, MusicBoxSong,
    PermissionChecker, PlayerFactory, ProgressIndicator, Result, SongPlayer, Tick, UserConfig,
    UserId,
};
use musicbox_playback::{SessionContext, SessionRegistry, SessionSettings};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ===== Engines =====

#[derive(Debug, Default)]
pub struct EngineStats {
    pub created: AtomicUsize,
    pub started: AtomicUsize,
    pub stopped: AtomicUsize,
    pub live: AtomicUsize,
    pub max_live: AtomicUsize,
}

impl EngineStats {
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }
}

pub struct FakePlayer {
    stats: Arc<EngineStats>,
    /// Live engines of the owning user only
    owner_live: Arc<AtomicUsize>,
    owner_max_live: Arc<AtomicUsize>,
    running: bool,
    tick: Tick,
    length: Tick,
}

impl SongPlayer for FakePlayer {
    fn start(&mut self, song: &MusicBoxSong) -> Result<()> {
        self.length = song.length;
        self.running = true;
        self.stats.started.fetch_add(1, Ordering::SeqCst);
        let live = self.stats.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.max_live.fetch_max(live, Ordering::SeqCst);
        let owner_live = self.owner_live.fetch_add(1, Ordering::SeqCst) + 1;
        self.owner_max_live.fetch_max(owner_live, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.stats.stopped.fetch_add(1, Ordering::SeqCst);
            self.stats.live.fetch_sub(1, Ordering::SeqCst);
            self.owner_live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn set_tick(&mut self, tick: Tick) {
        self.tick = tick;
    }

    fn tick(&self) -> Tick {
        self.tick
    }

    fn is_finished(&self) -> bool {
        self.tick >= self.length
    }
}

#[derive(Default)]
pub struct FakePlayerFactory {
    pub stats: Arc<EngineStats>,
    pub audiences: Mutex<Vec<Audience>>,
    pub fail: AtomicBool,
    per_user: Mutex<HashMap<UserId, (Arc<AtomicUsize>, Arc<AtomicUsize>)>>,
}

impl FakePlayerFactory {
    /// Highest number of engines that were live at once for `user`
    pub fn max_live_for(&self, user: &UserId) -> usize {
        self.per_user
            .lock()
            .unwrap()
            .get(user)
            .map_or(0, |(_, max)| max.load(Ordering::SeqCst))
    }

    pub fn last_audience(&self) -> Option<Audience> {
        self.audiences.lock().unwrap().last().cloned()
    }
}

impl PlayerFactory for FakePlayerFactory {
    fn create(&self, audience: &Audience) -> Result<Box<dyn SongPlayer>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MusicBoxError::engine("engine pool exhausted"));
        }
        self.stats.created.fetch_add(1, Ordering::SeqCst);
        self.audiences.lock().unwrap().push(audience.clone());

        let (owner_live, owner_max_live) = self
            .per_user
            .lock()
            .unwrap()
            .entry(audience.owner().clone())
            .or_default()
            .clone();

        Ok(Box::new(FakePlayer {
            stats: Arc::clone(&self.stats),
            owner_live,
            owner_max_live,
            running: false,
            tick: 0,
            length: 0,
        }))
    }
}

// ===== Indicators =====

#[derive(Debug, Default, Clone)]
pub struct IndicatorView {
    pub visible: bool,
    pub title: String,
    pub progress: f64,
    pub attached: Option<UserId>,
    pub detach_calls: usize,
}

pub struct FakeIndicator(Arc<Mutex<IndicatorView>>);

impl ProgressIndicator for FakeIndicator {
    fn set_visible(&mut self, visible: bool) {
        self.0.lock().unwrap().visible = visible;
    }

    fn set_title(&mut self, title: &str) {
        self.0.lock().unwrap().title = title.to_string();
    }

    fn set_progress(&mut self, progress: f64) {
        self.0.lock().unwrap().progress = progress;
    }

    fn attach(&mut self, user: &UserId) {
        self.0.lock().unwrap().attached = Some(user.clone());
    }

    fn detach(&mut self, _user: &UserId) {
        let mut view = self.0.lock().unwrap();
        view.attached = None;
        view.detach_calls += 1;
    }
}

#[derive(Default)]
pub struct FakeIndicatorFactory {
    pub created: Mutex<Vec<Arc<Mutex<IndicatorView>>>>,
}

impl FakeIndicatorFactory {
    /// Snapshot of the `index`-th created indicator
    pub fn view(&self, index: usize) -> IndicatorView {
        self.created.lock().unwrap()[index].lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.created.lock().unwrap().len()
    }
}

impl IndicatorFactory for FakeIndicatorFactory {
    fn create(&self, _style: &IndicatorStyle) -> Box<dyn ProgressIndicator> {
        let view = Arc::new(Mutex::new(IndicatorView::default()));
        self.created.lock().unwrap().push(Arc::clone(&view));
        Box::new(FakeIndicator(view))
    }
}

// ===== Storage =====

#[derive(Default)]
pub struct MemoryStore {
    pub records: Mutex<HashMap<UserId, UserConfig>>,
    pub loads: AtomicUsize,
    pub saves: AtomicUsize,
    pub fail_saves: AtomicBool,
}

impl MemoryStore {
    pub fn record(&self, user: &UserId) -> Option<UserConfig> {
        self.records.lock().unwrap().get(user).cloned()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl ConfigStore for MemoryStore {
    fn load(&self, user: &UserId) -> Result<UserConfig> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.record(user).unwrap_or_default())
    }

    fn save(&self, user: &UserId, config: &UserConfig) -> Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(MusicBoxError::storage("disk full"));
        }
        self.records
            .lock()
            .unwrap()
            .insert(user.clone(), config.clone());
        Ok(())
    }
}

// ===== Permissions =====

#[derive(Default)]
pub struct StaticPermissions {
    pub speakers: Mutex<HashSet<UserId>>,
}

impl StaticPermissions {
    pub fn grant(&self, user: &UserId) {
        self.speakers.lock().unwrap().insert(user.clone());
    }
}

impl PermissionChecker for StaticPermissions {
    fn has_permission(&self, user: &UserId, permission: &str) -> bool {
        permission == musicbox_core::SPEAKER_PERMISSION
            && self.speakers.lock().unwrap().contains(user)
    }
}

// ===== Harness =====

pub struct Harness {
    pub players: Arc<FakePlayerFactory>,
    pub indicators: Arc<FakeIndicatorFactory>,
    pub store: Arc<MemoryStore>,
    pub permissions: Arc<StaticPermissions>,
    pub registry: SessionRegistry,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(SessionSettings::default())
    }

    pub fn without_indicator() -> Self {
        Self::with_settings(SessionSettings {
            indicator_enabled: false,
            ..SessionSettings::default()
        })
    }

    pub fn with_settings(settings: SessionSettings) -> Self {
        let players = Arc::new(FakePlayerFactory::default());
        let indicators = Arc::new(FakeIndicatorFactory::default());
        let store = Arc::new(MemoryStore::default());
        let permissions = Arc::new(StaticPermissions::default());

        let context = SessionContext::new(
            players.clone(),
            indicators.clone(),
            store.clone(),
            permissions.clone(),
            settings,
        );

        Self {
            players,
            indicators,
            store,
            permissions,
            registry: SessionRegistry::new(context),
        }
    }
}

pub fn song(id: &str, length: Tick) -> Arc<MusicBoxSong> {
    Arc::new(MusicBoxSong::new(id, format!("Song {}", id), length))
}
