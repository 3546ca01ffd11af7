//! Credential token slot.
//!
//! DESIGN
//! ======
//! Exactly one bearer token is stored at a time, with an absolute expiry.
//! An expired token reads as absent and is dropped on read, so callers never
//! see a stale credential.
//!
//! The file-backed slot keeps `{ "token": ..., "expires_at": <unix secs> }`
//! with `0600` permissions. Token values are never logged.

#[cfg(test)]
#[path = "token_test.rs"]
mod token_test;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

/// How long a token issued at login stays in the slot.
pub const TOKEN_TTL: Duration = Duration::days(7);

#[derive(Debug, thiserror::Error)]
pub enum TokenStoreError {
    #[error("token file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("token serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Storage for the single credential token.
///
/// Shared by the session manager and the request layer; implementations must
/// be safe to call from either.
pub trait TokenStore: Send + Sync {
    /// Current unexpired token, if any.
    fn load(&self) -> Option<String>;

    /// Replace the stored token; it expires `ttl` from now.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be written.
    fn store(&self, token: &str, ttl: Duration) -> Result<(), TokenStoreError>;

    /// Remove the stored token. Clearing an empty slot is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing slot cannot be removed.
    fn clear(&self) -> Result<(), TokenStoreError>;
}

/// Token with its absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub token: String,
    /// Expiry as unix seconds.
    pub expires_at: i64,
}

impl StoredToken {
    #[must_use]
    pub fn issue(token: &str, ttl: Duration, now: OffsetDateTime) -> Self {
        Self { token: token.to_owned(), expires_at: (now + ttl).unix_timestamp() }
    }

    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now.unix_timestamp() >= self.expires_at
    }
}

// =============================================================================
// MEMORY
// =============================================================================

/// In-process slot; lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<StoredToken>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot pre-filled with `token`, valid for [`TOKEN_TTL`].
    #[must_use]
    pub fn with_token(token: &str) -> Self {
        let stored = StoredToken::issue(token, TOKEN_TTL, OffsetDateTime::now_utc());
        Self { slot: Mutex::new(Some(stored)) }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        let mut slot = self.slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if slot.as_ref().is_some_and(|stored| stored.is_expired_at(OffsetDateTime::now_utc())) {
            *slot = None;
        }
        slot.as_ref().map(|stored| stored.token.clone())
    }

    fn store(&self, token: &str, ttl: Duration) -> Result<(), TokenStoreError> {
        let stored = StoredToken::issue(token, ttl, OffsetDateTime::now_utc());
        *self.slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(stored);
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *self.slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = None;
        Ok(())
    }
}

// =============================================================================
// FILE
// =============================================================================

/// Slot persisted as a small JSON file so the session survives restarts.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<StoredToken>, TokenStoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(self.io_error(source)),
        };
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn io_error(&self, source: io::Error) -> TokenStoreError {
        TokenStoreError::Io { path: self.path.clone(), source }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        let stored = match self.read() {
            Ok(stored) => stored?,
            Err(e) => {
                tracing::warn!(error = %e, "unreadable token file; treating as signed out");
                return None;
            }
        };
        if stored.is_expired_at(OffsetDateTime::now_utc()) {
            tracing::debug!(path = %self.path.display(), "stored token expired");
            if let Err(e) = self.clear() {
                tracing::warn!(error = %e, "failed to remove expired token");
            }
            return None;
        }
        Some(stored.token)
    }

    fn store(&self, token: &str, ttl: Duration) -> Result<(), TokenStoreError> {
        let stored = StoredToken::issue(token, ttl, OffsetDateTime::now_utc());
        let contents = serde_json::to_string_pretty(&stored)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| TokenStoreError::Io { path: parent.to_path_buf(), source })?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
            let mut file = fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .map_err(|source| self.io_error(source))?;
            // `mode` only applies on create; tighten a pre-existing file too.
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(|source| self.io_error(source))?;
            file.write_all(contents.as_bytes())
                .map_err(|source| self.io_error(source))?;
        }

        #[cfg(not(unix))]
        {
            let mut file = fs::File::create(&self.path).map_err(|source| self.io_error(source))?;
            file.write_all(contents.as_bytes())
                .map_err(|source| self.io_error(source))?;
        }

        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error(source)),
        }
    }
}
