//! Device identity.
//!
//! Each device keeps its own anonymous [`User`] in a local cache and mirrors
//! it into the store. The cache is created on first run, refreshed every
//! session and never expires.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info};
use rusqlite::Connection;

use crate::db::repository::{ProgressRepo, UserRepo};
use crate::error::{Result, TrackerError};
use crate::models::User;

pub trait IdentityCache {
    fn load(&self) -> Result<Option<User>>;
    fn save(&self, user: &User) -> Result<()>;
}

/// Keeps the identity as JSON in the data directory.
pub struct FileIdentityCache {
    path: PathBuf,
}

impl FileIdentityCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IdentityCache for FileIdentityCache {
    fn load(&self) -> Result<Option<User>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&self, user: &User) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(user)?)?;
        Ok(())
    }
}

/// Return this device's user, creating it on first run.
///
/// A cached user gets `last_active` refreshed in both the cache and the
/// store; if the store has never seen it (fresh database, copied cache) the
/// row and an empty progress record are created.
pub fn bootstrap<C: IdentityCache>(cache: &C, conn: &Connection, now: DateTime<Utc>) -> Result<User> {
    let user = match cache.load()? {
        Some(mut user) => {
            user.last_active = now;
            cache.save(&user)?;
            debug!("loaded identity {}", user.id);
            user
        }
        None => {
            let user = User::new(now);
            cache.save(&user)?;
            info!("created identity {}", user.id);
            user
        }
    };

    if UserRepo::insert(conn, &user)? {
        ProgressRepo::insert_fresh(conn, &user.id)?;
    } else {
        UserRepo::touch(conn, &user.id, &now)?;
    }
    Ok(user)
}

/// Set the display name in both the cache and the store.
pub fn rename<C: IdentityCache>(cache: &C, conn: &Connection, name: &str) -> Result<User> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TrackerError::InvalidName("name cannot be empty".to_string()));
    }
    if name.chars().count() > 40 {
        return Err(TrackerError::InvalidName(
            "name must be at most 40 characters".to_string(),
        ));
    }

    let mut user = cache
        .load()?
        .ok_or_else(|| TrackerError::NotFound("local identity".to_string()))?;
    user.username = Some(name.to_string());
    cache.save(&user)?;

    if !UserRepo::set_username(conn, &user.id, Some(name))? {
        UserRepo::insert(conn, &user)?;
    }
    Ok(user)
}
