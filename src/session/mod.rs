//! In-process session store
//!
//! Sessions are opaque keys bound to a principal id and its privilege flag,
//! with an absolute expiry. The HTTP layer resolves a bearer token here;
//! the lifecycle engine never sees tokens, only principal ids.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// A live session
#[derive(Debug, Clone)]
pub struct Session {
    pub key: String,
    pub user_id: String,
    pub is_officer: bool,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Process-wide session map behind a reader/writer lock
pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(ttl_seconds: i64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_seconds),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Issue a fresh session for a principal
    pub fn create(&self, user_id: &str, is_officer: bool) -> Session {
        let session = Session {
            key: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            is_officer,
            expires_at: Utc::now() + self.ttl,
        };

        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sessions.insert(session.key.clone(), session.clone());

        session
    }

    /// Resolve a key; expired sessions are dropped and read as absent
    pub fn get(&self, key: &str) -> Option<Session> {
        let expired = {
            let sessions = self
                .sessions
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            match sessions.get(key) {
                Some(session) if session.is_expired() => true,
                Some(session) => return Some(session.clone()),
                None => return None,
            }
        };

        if expired {
            self.remove(key);
        }
        None
    }

    /// Revoke a session (logout); absent keys are a no-op
    pub fn remove(&self, key: &str) {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sessions.remove(key);
    }
}
