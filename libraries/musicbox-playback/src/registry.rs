//! Session registry
//!
//! Maps connected users to their sessions. The registry lock is always taken
//! before a session lock, never the other way round.

use crate::session::{PlaybackSession, SessionContext};
use musicbox_core::{Result, UserId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Registered sessions keyed by user; sessions keep a weak handle to it so a
/// direct `destroy` can remove its own entry
pub(crate) type SessionMap = RwLock<HashMap<UserId, Arc<PlaybackSession>>>;

/// Process-wide mapping from connected user to playback session
pub struct SessionRegistry {
    context: Arc<SessionContext>,
    sessions: Arc<SessionMap>,
}

impl SessionRegistry {
    pub fn new(context: SessionContext) -> Self {
        Self {
            context: Arc::new(context),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Session of `user`, without creating one
    pub fn get(&self, user: &UserId) -> Option<Arc<PlaybackSession>> {
        self.sessions.read().get(user).cloned()
    }

    /// Session of `user`, created on first use
    ///
    /// Concurrent callers for the same user all receive the same instance.
    ///
    /// # Errors
    /// Returns the store error if a new session cannot load its configuration
    pub fn get_or_create(&self, user: &UserId) -> Result<Arc<PlaybackSession>> {
        if let Some(session) = self.get(user) {
            return Ok(session);
        }

        let mut sessions = self.sessions.write();
        // Another caller may have won the race between the two locks
        if let Some(session) = sessions.get(user) {
            return Ok(Arc::clone(session));
        }

        let session = Arc::new(PlaybackSession::open(
            user.clone(),
            Arc::clone(&self.context),
            Arc::downgrade(&self.sessions),
        )?);
        sessions.insert(user.clone(), Arc::clone(&session));
        Ok(session)
    }

    /// Handle a user leaving: remove the entry, then destroy the session
    ///
    /// Returns whether the user had a session. A user without one is not an
    /// error. The registry lock is held until the configuration is saved, so
    /// a reconnect of the same user loads the saved record.
    ///
    /// # Errors
    /// Returns the store error if the configuration cannot be saved; the
    /// entry is removed regardless
    pub fn disconnect(&self, user: &UserId) -> Result<bool> {
        let mut sessions = self.sessions.write();

        match sessions.remove(user) {
            Some(session) => {
                session.close()?;
                Ok(true)
            }
            None => {
                debug!("Disconnect of {} without a session", user);
                Ok(false)
            }
        }
    }

    /// Destroy every session, e.g. on shutdown
    ///
    /// Each session is destroyed exactly once and the registry ends up
    /// empty. Holds the registry lock throughout, so no session can be
    /// created or disconnected concurrently.
    ///
    /// # Errors
    /// Every session is processed first; then the first failure is returned
    pub fn destroy_all(&self) -> Result<usize> {
        let mut sessions = self.sessions.write();

        let mut destroyed = 0;
        let mut first_error = None;
        for (user, session) in sessions.drain() {
            if let Err(e) = session.close() {
                error!("Failed to save session of {}: {}", user, e);
                first_error.get_or_insert(e);
            }
            destroyed += 1;
        }

        info!("Destroyed {} playback sessions", destroyed);
        match first_error {
            Some(e) => Err(e),
            None => Ok(destroyed),
        }
    }

    /// Advance every playing session by one host tick
    ///
    /// Returns how many sessions advanced.
    pub fn advance_all(&self) -> usize {
        let sessions: Vec<_> = self.sessions.read().values().cloned().collect();
        sessions
            .iter()
            .filter(|session| session.advance().is_some())
            .count()
    }

    /// Users that currently have a session
    pub fn users(&self) -> Vec<UserId> {
        let mut users: Vec<_> = self.sessions.read().keys().cloned().collect();
        users.sort();
        users
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
