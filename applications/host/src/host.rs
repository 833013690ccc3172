//! Applies host commands to the session registry

use crate::commands::Command;
use crate::config::HostConfig;
use crate::console::{ConfiguredPermissions, ConsoleIndicatorFactory, ConsolePlayerFactory};
use crate::error::{HostError, Result};
use musicbox_core::{MusicBoxSong, SongId, UserId};
use musicbox_playback::{PlaybackSession, PlaybackStatus, SessionContext, SessionRegistry};
use musicbox_storage::FileConfigStore;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Result of executing one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Text to show the operator
    Reply(String),

    /// The operator asked the host to shut down
    Quit,
}

/// Console host: one registry, one song catalog
pub struct MusicBoxHost {
    registry: SessionRegistry,
    catalog: HashMap<SongId, Arc<MusicBoxSong>>,
}

impl MusicBoxHost {
    /// Wire the console collaborators and the file store described by `config`
    pub fn new(config: &HostConfig) -> Self {
        let context = SessionContext::new(
            Arc::new(ConsolePlayerFactory),
            Arc::new(ConsoleIndicatorFactory),
            Arc::new(FileConfigStore::new(config.storage.players_folder.clone())),
            Arc::new(ConfiguredPermissions::new(
                config.permissions.speaker.iter().cloned(),
            )),
            config.session_settings(),
        );

        info!(
            "Host ready: {} songs, players folder {}",
            config.songs.len(),
            config.storage.players_folder.display()
        );

        Self {
            registry: SessionRegistry::new(context),
            catalog: config.catalog(),
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Execute one command
    ///
    /// Playing and switching open the user's session on demand; the other
    /// per-user commands need a connected user.
    pub fn execute(&self, command: Command) -> Result<Outcome> {
        let reply = match command {
            Command::Connect(user) => {
                self.registry.get_or_create(&user)?;
                format!("{} connected", user)
            }
            Command::Disconnect(user) => {
                if self.registry.disconnect(&user)? {
                    format!("{} disconnected", user)
                } else {
                    format!("{} was not connected", user)
                }
            }
            Command::Play { user, song, start } => {
                let song = self
                    .catalog
                    .get(&song)
                    .cloned()
                    .ok_or_else(|| HostError::UnknownSong(song.to_string()))?;
                let session = self.registry.get_or_create(&user)?;
                let name = song.name.clone();
                let status = session.play(song, start)?;
                format!("{}: {} ({})", user, name, status_label(status))
            }
            Command::Switch { user, force } => {
                let session = self.registry.get_or_create(&user)?;
                if force {
                    session.switch_mode()?;
                    format!("{}: {}", user, mode_label(&session))
                } else if session.switch_mode_checked()? {
                    format!("{}: {}", user, mode_label(&session))
                } else {
                    format!("{} may not use speaker mode", user)
                }
            }
            Command::Stop(user) => {
                self.connected(&user)?.stop_play();
                format!("{}: stopped", user)
            }
            Command::Bar { user, visible } => {
                let session = self.connected(&user)?;
                if !session.has_indicator() {
                    return Ok(Outcome::Reply(format!("{} has no progress bar", user)));
                }
                session.set_indicator_visible(visible);
                format!("{}: bar {}", user, if visible { "shown" } else { "hidden" })
            }
            Command::Tick(n) => {
                let mut playing = 0;
                for _ in 0..n {
                    playing = self.registry.advance_all();
                }
                format!("{} session(s) playing", playing)
            }
            Command::Status => self.status(),
            Command::Quit => return Ok(Outcome::Quit),
        };

        Ok(Outcome::Reply(reply))
    }

    /// One line per connected user
    pub fn status(&self) -> String {
        let users = self.registry.users();
        if users.is_empty() {
            return "no users connected".to_string();
        }

        let mut out = String::new();
        for user in users {
            let Some(session) = self.registry.get(&user) else {
                continue;
            };
            out.push_str(&format!("{}: {}", user, status_label(session.status())));
            if let (Some(song), Some(tick)) = (session.current_song(), session.current_tick()) {
                out.push_str(&format!(" {} @ {}/{}", song.name, tick, song.length));
            }
            out.push('\n');
        }
        out.pop();
        out
    }

    /// Drive the host from `input`, one command per line, while advancing
    /// every session once per `tick_interval`
    ///
    /// Runs until the input ends, a `quit` command or ctrl-c. Every session
    /// is shut down before returning, also when reading the input fails.
    ///
    /// # Errors
    /// Returns the shutdown error first, then the input error
    pub async fn run_lines<R>(&self, input: R, tick_interval: Duration) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        let mut ticker = tokio::time::interval(tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut input_error = None;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.registry.advance_all();
                }
                line = lines.next_line() => {
                    let line = match line {
                        Ok(Some(line)) => line,
                        Ok(None) => {
                            info!("Input closed");
                            break;
                        }
                        Err(e) => {
                            error!("Failed to read input: {}", e);
                            input_error = Some(e);
                            break;
                        }
                    };
                    match Command::parse(&line).and_then(|command| match command {
                        Some(command) => self.execute(command).map(Some),
                        None => Ok(None),
                    }) {
                        Ok(Some(Outcome::Reply(reply))) => println!("{}", reply),
                        Ok(Some(Outcome::Quit)) => break,
                        Ok(None) => {}
                        Err(e) => warn!("{}", e),
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted");
                    break;
                }
            }
        }

        self.shutdown()?;
        match input_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Destroy every session, saving each user's configuration
    pub fn shutdown(&self) -> Result<usize> {
        let destroyed = self.registry.destroy_all()?;
        info!("Closed {} session(s)", destroyed);
        Ok(destroyed)
    }

    fn connected(&self, user: &UserId) -> Result<Arc<PlaybackSession>> {
        self.registry
            .get(user)
            .ok_or_else(|| HostError::NoSession(user.to_string()))
    }
}

fn status_label(status: PlaybackStatus) -> &'static str {
    match status {
        PlaybackStatus::Idle => "idle",
        PlaybackStatus::PlayingRadio => "playing (radio)",
        PlaybackStatus::PlayingSpeaker => "playing (speaker)",
    }
}

fn mode_label(session: &PlaybackSession) -> &'static str {
    if session.is_speaker() {
        "speaker mode"
    } else {
        "radio mode"
    }
}
