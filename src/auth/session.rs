//! Session store: who, if anyone, is currently signed in.
//!
//! The token and user identity are held together in memory and mirrored to a
//! single JSON file so a restart restores the session. They are always
//! written and cleared as a pair; there is never a token without a user or a
//! user without a token.
//!
//! The store is shared (behind an `Arc`) with the `ApiClient`, which reads
//! the token immediately before each request. A login or logout therefore
//! takes effect on the very next call; requests already in flight complete
//! with whatever token was attached at send time.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::User;

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

/// Persisted session: the `token` and `user_data` keys, stored together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    #[serde(rename = "user_data")]
    pub user: User,
    pub created_at: DateTime<Utc>,
}

pub struct SessionStore {
    dir: PathBuf,
    data: RwLock<Option<SessionData>>,
}

impl SessionStore {
    /// Open a store rooted at `dir`, restoring any persisted session.
    ///
    /// An absent session file starts the store anonymous; an unreadable or
    /// corrupt one is discarded with a warning rather than failing startup.
    pub fn open(dir: PathBuf) -> Self {
        let data = match Self::read_file(&dir.join(SESSION_FILE)) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable session file");
                None
            }
        };
        if data.is_some() {
            debug!("Restored session from disk");
        }
        Self {
            dir,
            data: RwLock::new(data),
        }
    }

    fn read_file(path: &Path) -> Result<Option<SessionData>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path).context("Failed to read session file")?;
        let data = serde_json::from_str(&contents).context("Failed to parse session file")?;
        Ok(Some(data))
    }

    /// Store the token and user together, on disk first and then in memory,
    /// so a persistence failure leaves no partial state.
    pub fn login(&self, user: User, token: String) -> Result<()> {
        let data = SessionData {
            token,
            user,
            created_at: Utc::now(),
        };
        self.persist(&data)?;
        *self.data.write() = Some(data);
        Ok(())
    }

    /// Clear the session from disk first and then memory, so a failed
    /// removal leaves both sides still agreeing on the session. Idempotent:
    /// logging out while already anonymous is a no-op.
    pub fn logout(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove session file")?;
        }
        *self.data.write() = None;
        Ok(())
    }

    /// Replace the stored identity while keeping the token, used after the
    /// signed-in user edits their own profile.
    pub fn update_user(&self, user: User) -> Result<()> {
        let updated = {
            let guard = self.data.read();
            match guard.as_ref() {
                Some(data) => SessionData {
                    user,
                    ..data.clone()
                },
                None => return Ok(()),
            }
        };
        self.persist(&updated)?;
        *self.data.write() = Some(updated);
        Ok(())
    }

    /// Get the bearer token if a session exists
    pub fn token(&self) -> Option<String> {
        self.data.read().as_ref().map(|d| d.token.clone())
    }

    /// Get the signed-in user if a session exists
    pub fn current_user(&self) -> Option<User> {
        self.data.read().as_ref().map(|d| d.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.data.read().is_some()
    }

    /// Snapshot of the full session, if any
    pub fn session(&self) -> Option<SessionData> {
        self.data.read().clone()
    }

    fn persist(&self, data: &SessionData) -> Result<()> {
        std::fs::create_dir_all(&self.dir).context("Failed to create session directory")?;
        let contents = serde_json::to_string_pretty(data)?;
        std::fs::write(self.session_path(), contents).context("Failed to write session file")?;
        Ok(())
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        User {
            id: 1,
            username: "alice".to_string(),
            email: Some("a@x.com".to_string()),
        }
    }

    #[test]
    fn test_login_then_read_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::open(dir.path().to_path_buf());
        assert!(!store.is_authenticated());

        store.login(alice(), "tok123".to_string()).expect("login");
        assert!(store.is_authenticated());
        assert_eq!(store.token().as_deref(), Some("tok123"));
        assert_eq!(store.current_user(), Some(alice()));
    }

    #[test]
    fn test_session_survives_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let store = SessionStore::open(dir.path().to_path_buf());
            store.login(alice(), "tok123".to_string()).expect("login");
        }

        // Simulated process restart
        let store = SessionStore::open(dir.path().to_path_buf());
        assert!(store.is_authenticated());
        assert_eq!(store.token().as_deref(), Some("tok123"));
        assert_eq!(store.current_user(), Some(alice()));
    }

    #[test]
    fn test_both_keys_persisted_together() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::open(dir.path().to_path_buf());
        store.login(alice(), "tok123".to_string()).expect("login");

        let contents =
            std::fs::read_to_string(dir.path().join(SESSION_FILE)).expect("session file");
        let value: serde_json::Value = serde_json::from_str(&contents).expect("valid json");
        assert_eq!(value["token"], "tok123");
        assert_eq!(value["user_data"]["username"], "alice");
    }

    #[test]
    fn test_logout_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::open(dir.path().to_path_buf());

        // Logging out while anonymous is a no-op
        store.logout().expect("logout while anonymous");
        assert!(!store.is_authenticated());

        store.login(alice(), "tok123".to_string()).expect("login");
        store.logout().expect("first logout");
        store.logout().expect("second logout");
        assert!(!store.is_authenticated());
        assert!(!dir.path().join(SESSION_FILE).exists());
    }

    #[test]
    fn test_failed_logout_keeps_memory_and_disk_consistent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::open(dir.path().to_path_buf());
        store.login(alice(), "tok123".to_string()).expect("login");

        // Make the session file unremovable by swapping it for a directory
        let path = dir.path().join(SESSION_FILE);
        std::fs::remove_file(&path).expect("remove file");
        std::fs::create_dir(&path).expect("create dir");

        store.logout().expect_err("logout should fail");
        // The in-memory session survives, matching what is still on disk
        assert!(store.is_authenticated());
        assert_eq!(store.token().as_deref(), Some("tok123"));
    }

    #[test]
    fn test_corrupt_session_file_starts_anonymous() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(SESSION_FILE), "{not valid json").expect("write");

        let store = SessionStore::open(dir.path().to_path_buf());
        assert!(!store.is_authenticated());
        assert_eq!(store.token(), None);
    }

    #[test]
    fn test_update_user_keeps_token() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::open(dir.path().to_path_buf());
        store.login(alice(), "tok123".to_string()).expect("login");

        let renamed = User {
            username: "alice2".to_string(),
            ..alice()
        };
        store.update_user(renamed.clone()).expect("update");
        assert_eq!(store.token().as_deref(), Some("tok123"));
        assert_eq!(store.current_user(), Some(renamed));

        // And while anonymous it is a no-op
        store.logout().expect("logout");
        store.update_user(alice()).expect("update while anonymous");
        assert!(!store.is_authenticated());
    }
}
