//! Server-side OAuth sessions: the pending authorization state per browser.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Session {
    oauth_state: String,
    created_at: Instant,
}

#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Open a session holding `oauth_state` and return its id.
    pub async fn create(&self, oauth_state: String) -> String {
        let id = Uuid::new_v4().simple().to_string();
        self.sessions.write().await.insert(
            id.clone(),
            Session {
                oauth_state,
                created_at: Instant::now(),
            },
        );
        id
    }

    /// Remove and return the pending state. A state can be taken only once.
    pub async fn take_state(&self, session_id: &str) -> Option<String> {
        let session = self.sessions.write().await.remove(session_id)?;
        if session.created_at.elapsed() < self.ttl {
            Some(session.oauth_state)
        } else {
            None
        }
    }

    pub async fn cleanup_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.created_at.elapsed() < self.ttl);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

pub fn spawn_session_cleanup(store: Arc<SessionStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let removed = store.cleanup_expired().await;
            if removed > 0 {
                tracing::debug!(removed, "Expired OAuth sessions removed");
            }
        }
    })
}
