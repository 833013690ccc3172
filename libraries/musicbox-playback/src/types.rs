//! Core types for session management

use musicbox_core::{IndicatorStyle, ModeKind};
use serde::{Deserialize, Serialize};

/// Host settings consumed when sessions are created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Create a progress indicator for every session (default: true)
    pub indicator_enabled: bool,

    /// Look of created indicators
    pub indicator_style: IndicatorStyle,

    /// Audible radius of speaker mode in blocks (default: 16.0)
    pub speaker_radius: f64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            indicator_enabled: true,
            indicator_style: IndicatorStyle::default(),
            speaker_radius: 16.0,
        }
    }
}

/// Observable state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackStatus {
    /// No mode active
    Idle,

    /// Private playback to the owner
    PlayingRadio,

    /// Shared playback to nearby users
    PlayingSpeaker,
}

impl PlaybackStatus {
    /// Status of a session whose active mode is `kind`
    pub fn playing(kind: ModeKind) -> Self {
        match kind {
            ModeKind::Radio => PlaybackStatus::PlayingRadio,
            ModeKind::Speaker => PlaybackStatus::PlayingSpeaker,
        }
    }

    pub fn is_playing(self) -> bool {
        !matches!(self, PlaybackStatus::Idle)
    }
}
