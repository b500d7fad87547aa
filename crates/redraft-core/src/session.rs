//! Session credential storage.
//!
//! Stores the backend token pair in `<home>/session.json` with restricted
//! permissions (0600), alongside a `profile.json` cache of the logged-in
//! user's profile. Tokens are never logged or displayed in full.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::paths;

/// Session file name under the Redraft home directory.
const SESSION_FILE: &str = "session.json";

/// Cached user-profile file name, cleared together with the session.
const PROFILE_CACHE_FILE: &str = "profile.json";

/// The token pair identifying an authenticated client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Short-lived credential sent with each authenticated request.
    pub access: String,
    /// Longer-lived credential exchanged for a new access token.
    pub refresh: String,
}

/// Storage for the current session's credentials.
///
/// Reads are infallible: an unreadable or corrupt store behaves as
/// "logged out". Writes surface I/O errors. Under concurrent use the store
/// is last-write-wins; no reader ever observes a half-updated pair.
pub trait SessionStore: Send + Sync {
    /// Returns the current session, or `None` when logged out.
    fn get(&self) -> Option<Session>;

    /// Replaces both tokens.
    fn set(&self, session: Session) -> Result<()>;

    /// Replaces only the access token, keeping the refresh token.
    /// A no-op when no session is present.
    fn set_access(&self, access: &str) -> Result<()>;

    /// Removes both tokens and any cached profile data. Idempotent.
    fn clear(&self) -> Result<()>;
}

/// File-backed session store.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Creates a store rooted at a specific directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
        }
    }

    /// Creates a store rooted at the Redraft home directory.
    pub fn default_location() -> Self {
        Self::new(paths::redraft_home())
    }

    /// Returns the path to the session file.
    pub fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    /// Returns the path to the profile cache file.
    pub fn profile_cache_path(&self) -> PathBuf {
        self.dir.join(PROFILE_CACHE_FILE)
    }

    /// Caches the user-profile JSON blob next to the session.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub fn cache_profile(&self, blob: &str) -> Result<()> {
        write_restricted(&self.profile_cache_path(), blob)
    }

    /// Returns the cached user-profile blob, if present.
    pub fn cached_profile(&self) -> Option<String> {
        fs::read_to_string(self.profile_cache_path()).ok()
    }

    fn save(&self, session: &Session) -> Result<()> {
        let contents =
            serde_json::to_string_pretty(session).context("Failed to serialize session")?;
        write_restricted(&self.session_path(), &contents)
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Option<Session> {
        let path = self.session_path();
        let contents = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(session) => Some(session),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "ignoring unreadable session file");
                None
            }
        }
    }

    fn set(&self, session: Session) -> Result<()> {
        self.save(&session)
    }

    fn set_access(&self, access: &str) -> Result<()> {
        let Some(mut session) = self.get() else {
            return Ok(());
        };
        session.access = access.to_string();
        self.save(&session)
    }

    fn clear(&self) -> Result<()> {
        remove_if_present(&self.session_path())?;
        remove_if_present(&self.profile_cache_path())?;
        Ok(())
    }
}

/// In-memory session store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    session: Option<Session>,
    profile: Option<String>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with a session.
    pub fn with_session(access: &str, refresh: &str) -> Self {
        let store = Self::new();
        store
            .set(Session {
                access: access.to_string(),
                refresh: refresh.to_string(),
            })
            .expect("in-memory set cannot fail");
        store
    }

    /// Caches the user-profile blob in memory.
    pub fn cache_profile(&self, blob: &str) {
        self.inner.lock().expect("session store lock").profile = Some(blob.to_string());
    }

    /// Returns the cached user-profile blob, if present.
    pub fn cached_profile(&self) -> Option<String> {
        self.inner.lock().expect("session store lock").profile.clone()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Option<Session> {
        self.inner.lock().expect("session store lock").session.clone()
    }

    fn set(&self, session: Session) -> Result<()> {
        self.inner.lock().expect("session store lock").session = Some(session);
        Ok(())
    }

    fn set_access(&self, access: &str) -> Result<()> {
        let mut state = self.inner.lock().expect("session store lock");
        if let Some(session) = state.session.as_mut() {
            session.access = access.to_string();
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut state = self.inner.lock().expect("session store lock");
        state.session = None;
        state.profile = None;
        Ok(())
    }
}

/// Writes a file with restricted permissions (0600), creating parent
/// directories as needed.
fn write_restricted(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .with_context(|| format!("Failed to open {} for writing", path.display()))?;
        file.write_all(contents.as_bytes())
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    }

    #[cfg(not(unix))]
    {
        fs::write(path, contents)
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    }

    Ok(())
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => {
            Err(err).with_context(|| format!("Failed to remove {}", path.display()))
        }
    }
}
