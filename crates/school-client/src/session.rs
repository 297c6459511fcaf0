//! Persistent session storage.
//!
//! The session is two strings, the access token and the refresh token, kept
//! under fixed keys in a key-value store so they survive restarts.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{ClientError, Result};

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Key-value persistence for the token pair.
///
/// No validation and no expiry: callers decide what a token means.
pub trait SessionStore: Send + Sync {
    /// Current access token, if any.
    fn get(&self) -> Option<String>;

    /// Current refresh token, if any.
    fn refresh_token(&self) -> Option<String>;

    /// Persist both tokens, replacing any previous pair.
    fn set(&self, access: &str, refresh: &str) -> Result<()>;

    /// Remove both tokens.
    fn clear(&self) -> Result<()>;

    fn is_empty(&self) -> bool {
        self.get().is_none() && self.refresh_token().is_none()
    }
}

/// In-memory store. Lives as long as the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_key(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Option<String> {
        self.read_key(ACCESS_TOKEN_KEY)
    }

    fn refresh_token(&self) -> Option<String> {
        self.read_key(REFRESH_TOKEN_KEY)
    }

    fn set(&self, access: &str, refresh: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| ClientError::Storage("session lock poisoned".to_string()))?;
        entries.insert(ACCESS_TOKEN_KEY.to_string(), access.to_string());
        entries.insert(REFRESH_TOKEN_KEY.to_string(), refresh.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| ClientError::Storage("session lock poisoned".to_string()))?;
        entries.remove(ACCESS_TOKEN_KEY);
        entries.remove(REFRESH_TOKEN_KEY);
        Ok(())
    }
}

/// Store backed by a small YAML file of string keys.
///
/// The file is re-read on every access so several processes sharing one
/// context see each other's logins and logouts.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if entries.is_empty() {
            if self.path.exists() {
                fs::remove_file(&self.path)?;
            }
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_yaml::to_string(entries)?)?;
        restrict_permissions(&self.path)?;
        Ok(())
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match self.load() {
            Ok(mut entries) => entries.remove(key),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Unreadable session file");
                None
            }
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Option<String> {
        self.read_key(ACCESS_TOKEN_KEY)
    }

    fn refresh_token(&self) -> Option<String> {
        self.read_key(REFRESH_TOKEN_KEY)
    }

    fn set(&self, access: &str, refresh: &str) -> Result<()> {
        let mut entries = self.load()?;
        entries.insert(ACCESS_TOKEN_KEY.to_string(), access.to_string());
        entries.insert(REFRESH_TOKEN_KEY.to_string(), refresh.to_string());
        self.save(&entries)
    }

    fn clear(&self) -> Result<()> {
        let mut entries = self.load()?;
        entries.remove(ACCESS_TOKEN_KEY);
        entries.remove(REFRESH_TOKEN_KEY);
        self.save(&entries)
    }
}
