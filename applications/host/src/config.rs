/// Host configuration
use crate::error::{HostError, Result};
use musicbox_core::{BarColor, BarStyle, IndicatorStyle, MusicBoxSong, SongId, UserId};
use musicbox_playback::SessionSettings;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Config file read when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "musicbox.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HostConfig {
    #[serde(default)]
    pub indicator: IndicatorSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub speaker: SpeakerSettings,

    #[serde(default)]
    pub permissions: PermissionSettings,

    /// Songs users can play
    #[serde(default)]
    pub songs: Vec<MusicBoxSong>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndicatorSettings {
    #[serde(default = "default_enable")]
    pub enable: bool,

    #[serde(default)]
    pub color: BarColor,

    #[serde(default)]
    pub style: BarStyle,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_players_folder")]
    pub players_folder: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpeakerSettings {
    /// Audible radius in blocks
    #[serde(default = "default_radius")]
    pub radius: f64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PermissionSettings {
    /// Users allowed to switch into speaker mode
    #[serde(default)]
    pub speaker: Vec<UserId>,
}

impl HostConfig {
    /// Load configuration from file and environment
    ///
    /// An explicitly given file must exist; the default `musicbox.toml` is
    /// optional. Environment variables prefixed with `MUSICBOX_` override
    /// file values, with `__` separating nested keys
    /// (`MUSICBOX_SPEAKER__RADIUS=24`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(required))
            .add_source(
                config::Environment::with_prefix("MUSICBOX")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("permissions.speaker")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let radius = self.speaker.radius;
        if radius.is_nan() || radius <= 0.0 {
            return Err(HostError::Config(format!(
                "speaker.radius must be positive, got {}",
                radius
            )));
        }

        let mut seen = HashSet::new();
        for song in &self.songs {
            if !seen.insert(&song.id) {
                return Err(HostError::Config(format!("duplicate song id {}", song.id)));
            }
            if song.speed.is_nan() || song.speed <= 0.0 {
                return Err(HostError::Config(format!(
                    "song {} must have a positive speed",
                    song.id
                )));
            }
        }

        Ok(())
    }

    /// Settings handed to every new session
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            indicator_enabled: self.indicator.enable,
            indicator_style: IndicatorStyle {
                color: self.indicator.color,
                style: self.indicator.style,
            },
            speaker_radius: self.speaker.radius,
        }
    }

    /// Song catalog keyed by id
    pub fn catalog(&self) -> HashMap<SongId, Arc<MusicBoxSong>> {
        self.songs
            .iter()
            .map(|song| (song.id.clone(), Arc::new(song.clone())))
            .collect()
    }
}

// Default values
fn default_enable() -> bool {
    true
}

fn default_players_folder() -> PathBuf {
    PathBuf::from("./data/players")
}

fn default_radius() -> f64 {
    16.0
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            enable: default_enable(),
            color: BarColor::default(),
            style: BarStyle::default(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            players_folder: default_players_folder(),
        }
    }
}

impl Default for SpeakerSettings {
    fn default() -> Self {
        Self {
            radius: default_radius(),
        }
    }
}
