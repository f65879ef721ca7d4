use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::application::ChatSession;

pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 60 * 60;
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

struct Entry {
    session: Arc<Mutex<ChatSession>>,
    last_access: Instant,
}

/// Live chat sessions keyed by id.
///
/// Each session sits behind its own mutex, so events on one session run one
/// at a time while separate sessions proceed independently. A session not
/// touched for `idle_timeout` is dropped together with its database pool,
/// and the oldest session makes room once `max_sessions` is reached.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Entry>>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
            DEFAULT_MAX_SESSIONS,
        )
    }
}

impl SessionStore {
    pub fn new(idle_timeout: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    pub async fn insert(&self, session: ChatSession) -> Uuid {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        self.evict_idle_locked(&mut sessions, now);

        if sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_access)
                .map(|(id, _)| *id);
            if let Some(id) = oldest {
                debug!("Session limit reached, dropping oldest session {}", id);
                sessions.remove(&id);
            }
        }

        let id = Uuid::new_v4();
        sessions.insert(
            id,
            Entry {
                session: Arc::new(Mutex::new(session)),
                last_access: now,
            },
        );
        id
    }

    /// Look a session up and mark it as used.
    pub async fn get(&self, id: &Uuid) -> Option<Arc<Mutex<ChatSession>>> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(id)?;
        entry.last_access = Instant::now();
        Some(entry.session.clone())
    }

    pub async fn remove(&self, id: &Uuid) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Drop every session idle for at least the timeout. Returns how many went.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        self.evict_idle_locked(&mut sessions, Instant::now())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn evict_idle_locked(&self, sessions: &mut HashMap<Uuid, Entry>, now: Instant) -> usize {
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let keep = now.duration_since(entry.last_access) < self.idle_timeout;
            if !keep {
                debug!("Dropping idle session {}", id);
            }
            keep
        });
        before - sessions.len()
    }
}
