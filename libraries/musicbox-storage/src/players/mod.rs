//! Per-user configuration records
//!
//! One pretty-printed JSON object per user. Writes go to a temporary file in
//! the same folder and are renamed into place, so a crash mid-save never
//! leaves a truncated record behind.

use crate::error::{Result, StorageError};
use musicbox_core::{ConfigStore, UserConfig, UserId};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extension of configuration records
pub const RECORD_EXTENSION: &str = "json";

/// Stores each user's configuration as `<root>/<user-id>.json`
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    root: PathBuf,
}

impl FileConfigStore {
    /// Create a store rooted at `root`; the folder is created on first save
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the record belonging to `user`
    ///
    /// # Errors
    ///
    /// Returns `InvalidUserId` if the id is empty or would escape the root
    pub fn record_path(&self, user: &UserId) -> Result<PathBuf> {
        let id = user.as_str();
        let valid = !id.is_empty()
            && id != "."
            && id != ".."
            && !id.contains(&['/', '\\', '\0'][..]);
        if !valid {
            return Err(StorageError::InvalidUserId(id.to_string()));
        }
        Ok(self.root.join(format!("{}.{}", id, RECORD_EXTENSION)))
    }

    /// Load the record of `user`
    ///
    /// # Returns
    ///
    /// An empty configuration if the user has no record yet
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be read or is not a JSON object
    pub fn load_record(&self, user: &UserId) -> Result<UserConfig> {
        let path = self.record_path(user)?;

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config record for {}, starting empty", user);
                return Ok(UserConfig::default());
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&contents)
            .map_err(|e| StorageError::corrupt(path.display().to_string(), e.to_string()))
    }

    /// Write the record of `user`, replacing any previous one
    ///
    /// # Errors
    ///
    /// Returns an error if the folder or the record cannot be written
    pub fn save_record(&self, user: &UserId, config: &UserConfig) -> Result<()> {
        let path = self.record_path(user)?;
        fs::create_dir_all(&self.root)?;

        let json = serde_json::to_string_pretty(config)
            .map_err(|e| StorageError::corrupt(path.display().to_string(), e.to_string()))?;

        let tmp = path.with_extension(format!("{}.tmp", RECORD_EXTENSION));
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;

        debug!("Saved config record for {} to {}", user, path.display());
        Ok(())
    }

    /// Delete the record of `user`; returns whether one existed
    ///
    /// # Errors
    ///
    /// Returns an error if an existing record cannot be removed
    pub fn delete_record(&self, user: &UserId) -> Result<bool> {
        let path = self.record_path(user)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self, user: &UserId) -> musicbox_core::Result<UserConfig> {
        Ok(self.load_record(user)?)
    }

    fn save(&self, user: &UserId, config: &UserConfig) -> musicbox_core::Result<()> {
        Ok(self.save_record(user, config)?)
    }
}
