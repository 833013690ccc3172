//! Line-based host commands
//!
//! One command per line, words separated by whitespace. Blank lines and
//! lines starting with `#` are ignored.

use crate::error::{HostError, Result};
use musicbox_core::{SongId, Tick, UserId};

/// Largest `tick <n>` accepted: one minute of playback at 20 ticks per second
pub const MAX_TICKS_PER_COMMAND: u32 = 1200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A user joined; opens their session
    Connect(UserId),

    /// A user left; destroys their session
    Disconnect(UserId),

    /// Play a catalog song, optionally from a tick
    Play {
        user: UserId,
        song: SongId,
        start: Option<Tick>,
    },

    /// Toggle between radio and speaker mode
    ///
    /// Unless forced, entering speaker mode requires the speaker permission
    Switch { user: UserId, force: bool },

    Stop(UserId),

    /// Show or hide a user's progress bar
    Bar { user: UserId, visible: bool },

    /// Advance every playing session by `n` ticks
    Tick(u32),

    Status,

    Quit,
}

impl Command {
    /// Parse one line; `Ok(None)` for blank lines and comments
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let words: Vec<&str> = line.split_whitespace().collect();
        let command = match words.as_slice() {
            ["connect", user] => Command::Connect(UserId::new(*user)),
            ["disconnect", user] => Command::Disconnect(UserId::new(*user)),
            ["play", user, song] => Command::Play {
                user: UserId::new(*user),
                song: SongId::new(*song),
                start: None,
            },
            ["play", user, song, tick] => Command::Play {
                user: UserId::new(*user),
                song: SongId::new(*song),
                start: Some(parse_number(tick)?),
            },
            ["switch", user] => Command::Switch {
                user: UserId::new(*user),
                force: false,
            },
            ["switch", user, "--force"] => Command::Switch {
                user: UserId::new(*user),
                force: true,
            },
            ["stop", user] => Command::Stop(UserId::new(*user)),
            ["bar", user, "on"] => Command::Bar {
                user: UserId::new(*user),
                visible: true,
            },
            ["bar", user, "off"] => Command::Bar {
                user: UserId::new(*user),
                visible: false,
            },
            ["tick"] => Command::Tick(1),
            ["tick", n] => {
                let n = parse_number(n)?;
                if n > MAX_TICKS_PER_COMMAND {
                    return Err(HostError::command(format!(
                        "at most {} ticks per command",
                        MAX_TICKS_PER_COMMAND
                    )));
                }
                Command::Tick(n)
            }
            ["status"] => Command::Status,
            ["quit" | "exit"] => Command::Quit,
            [name, ..] => {
                return Err(HostError::command(format!(
                    "unrecognised `{}` (try connect, disconnect, play, switch, stop, bar, tick, status, quit)",
                    name
                )))
            }
            [] => return Ok(None),
        };

        Ok(Some(command))
    }
}

fn parse_number(word: &str) -> Result<u32> {
    word.parse()
        .map_err(|_| HostError::command(format!("`{}` is not a tick count", word)))
}
