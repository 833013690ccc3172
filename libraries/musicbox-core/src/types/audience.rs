//! Who a song player emits to

use super::UserId;
use serde::{Deserialize, Serialize};

/// Playback mode of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    /// Private playback, audible only to the owner
    Radio,

    /// Shared playback, audible to users near the owner
    Speaker,
}

impl ModeKind {
    /// Mode selected by a session's speaker flag
    pub fn from_speaker_flag(speaker: bool) -> Self {
        if speaker {
            ModeKind::Speaker
        } else {
            ModeKind::Radio
        }
    }
}

/// Target audience handed to the player factory when an engine is created
#[derive(Debug, Clone, PartialEq)]
pub enum Audience {
    /// Only the owning user hears the song
    Listener(UserId),

    /// Everyone within `radius` blocks of the owner's position hears the song
    Nearby {
        /// User whose position is the centre of the audible area
        center: UserId,
        /// Audible radius in blocks
        radius: f64,
    },
}

impl Audience {
    /// Owning user of the audience
    pub fn owner(&self) -> &UserId {
        match self {
            Audience::Listener(user) => user,
            Audience::Nearby { center, .. } => center,
        }
    }

    /// Mode this audience belongs to
    pub fn kind(&self) -> ModeKind {
        match self {
            Audience::Listener(_) => ModeKind::Radio,
            Audience::Nearby { .. } => ModeKind::Speaker,
        }
    }
}
