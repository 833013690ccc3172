mod audience;
mod ids;
mod indicator;
mod song;
mod user_config;

pub use audience::{Audience, ModeKind};
pub use ids::{SongId, UserId};
pub use indicator::{BarColor, BarStyle, IndicatorStyle};
pub use song::{MusicBoxSong, Tick};
pub use user_config::UserConfig;
