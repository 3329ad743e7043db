//! In-memory session store.
//!
//! Maps a session key to its [`Session`], creating sessions on first contact
//! and evicting them after a period of inactivity. The map lock is only held
//! for lookups; each session has its own async mutex so that turns on the same
//! key run one at a time while different keys proceed concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Local;

use crate::error::ChatError;
use crate::types::{Role, Session};

/// Shared handle to one session.
pub type SessionHandle = Arc<tokio::sync::Mutex<Session>>;

/// Keyed, process-lifetime session store with TTL eviction.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionHandle>>,
    system_prompt: String,
    ttl: Option<Duration>,
}

impl SessionStore {
    /// Create a store whose sessions start with `system_prompt`.
    ///
    /// `ttl` of `None` keeps sessions for the life of the process.
    pub fn new(system_prompt: impl Into<String>, ttl: Option<Duration>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            system_prompt: system_prompt.into(),
            ttl,
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Return the session for `key`, creating it if missing or expired.
    pub fn get_or_create(&self, key: &str) -> SessionHandle {
        let now = Local::now().timestamp();
        let mut sessions = self.lock_map();

        if let Some(handle) = sessions.get(key) {
            if !self.handle_expired(handle, now) {
                return Arc::clone(handle);
            }
            tracing::debug!(session = key, "Session expired; starting a new one");
        }

        let handle = Arc::new(tokio::sync::Mutex::new(Session::new(
            key,
            &self.system_prompt,
            now,
        )));
        sessions.insert(key.to_string(), Arc::clone(&handle));
        tracing::info!(session = key, "Session created");
        handle
    }

    /// Append a turn to the session for `key`, creating the session if needed.
    ///
    /// `role` must be `system`, `user` or `assistant`.
    pub async fn append_turn(&self, key: &str, role: &str, content: &str) -> Result<(), ChatError> {
        let role: Role = role.parse()?;
        let handle = self.get_or_create(key);
        let mut session = handle.lock().await;
        session.push_turn(role, content);
        session.last_active_at = Local::now().timestamp();
        Ok(())
    }

    /// Handle to an existing, unexpired session.
    pub fn get(&self, key: &str) -> Option<SessionHandle> {
        let now = Local::now().timestamp();
        self.lock_map()
            .get(key)
            .filter(|h| !self.handle_expired(h, now))
            .map(Arc::clone)
    }

    /// Copy of the session for `key`, if it exists.
    pub async fn snapshot(&self, key: &str) -> Option<Session> {
        let handle = self.get(key)?;
        let session = handle.lock().await;
        Some(session.clone())
    }

    /// Remove the session for `key`. Returns whether it existed.
    pub fn evict(&self, key: &str) -> bool {
        let removed = self.lock_map().remove(key).is_some();
        if removed {
            tracing::info!(session = key, "Session evicted");
        }
        removed
    }

    /// Remove every session idle for longer than the TTL.
    ///
    /// Sessions in the middle of a turn are never removed.
    pub fn evict_expired(&self) -> usize {
        if self.ttl.is_none() {
            return 0;
        }
        let now = Local::now().timestamp();
        let mut sessions = self.lock_map();
        let before = sessions.len();
        sessions.retain(|_, handle| !self.handle_expired(handle, now));
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.lock_map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_map().is_empty()
    }

    /// Keys of all stored sessions, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock_map().keys().cloned().collect();
        keys.sort();
        keys
    }

    // -- Private helpers --

    fn lock_map(&self) -> MutexGuard<'_, HashMap<String, SessionHandle>> {
        self.sessions.lock().unwrap_or_else(|poisoned| {
            tracing::error!("Session map lock poisoned; recovering");
            poisoned.into_inner()
        })
    }

    /// A session that is locked is in use and therefore not expired.
    fn handle_expired(&self, handle: &SessionHandle, now: i64) -> bool {
        let Some(ttl) = self.ttl else {
            return false;
        };
        match handle.try_lock() {
            Ok(session) => now - session.last_active_at > ttl.as_secs() as i64,
            Err(_) => false,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
