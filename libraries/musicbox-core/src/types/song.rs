//! Composition metadata consumed by the session core

use super::SongId;
use serde::{Deserialize, Serialize};

/// Discrete playback position, counted in song ticks from the start
pub type Tick = u32;

/// A composition that can be handed to a song player
///
/// Shared read-only between the session that plays it and the engine that
/// renders it, usually behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicBoxSong {
    /// Unique song identifier
    pub id: SongId,

    /// Display name, shown as the progress indicator title
    pub name: String,

    /// Total length in ticks
    pub length: Tick,

    /// Playback speed in ticks per second (default: 20.0)
    #[serde(default = "default_speed")]
    pub speed: f32,
}

fn default_speed() -> f32 {
    20.0
}

impl MusicBoxSong {
    /// Create a song with the default speed
    pub fn new(id: impl Into<String>, name: impl Into<String>, length: Tick) -> Self {
        Self {
            id: SongId::new(id),
            name: name.into(),
            length,
            speed: default_speed(),
        }
    }

    /// Fraction of the song covered at `tick`, clamped to `[0, 1]`
    pub fn progress_at(&self, tick: Tick) -> f64 {
        if self.length == 0 {
            return 1.0;
        }
        (f64::from(tick) / f64::from(self.length)).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_clamped() {
        let song = MusicBoxSong::new("s", "Song", 200);
        assert_eq!(song.progress_at(0), 0.0);
        assert_eq!(song.progress_at(50), 0.25);
        assert_eq!(song.progress_at(500), 1.0);
    }

    #[test]
    fn empty_song_is_always_complete() {
        let song = MusicBoxSong::new("s", "Empty", 0);
        assert_eq!(song.progress_at(0), 1.0);
    }

    #[test]
    fn speed_defaults_when_missing() {
        let song: MusicBoxSong =
            serde_json::from_str(r#"{"id":"a","name":"A","length":10}"#).unwrap();
        assert_eq!(song.speed, 20.0);
    }
}
