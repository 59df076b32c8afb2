//! In-memory session registry, keyed by channel, user and thread.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use super::ChatSession;

/// Identifies one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub channel: String,
    pub user_id: String,
    pub thread_id: Option<String>,
}

impl SessionKey {
    pub fn new(channel: &str, user_id: &str, thread_id: Option<&str>) -> Self {
        Self {
            channel: channel.to_string(),
            user_id: user_id.to_string(),
            thread_id: thread_id.map(String::from),
        }
    }
}

/// Owns every live [`ChatSession`]. Nothing is persisted.
pub struct SessionManager {
    greeting: String,
    sessions: Mutex<HashMap<SessionKey, ChatSession>>,
}

impl SessionManager {
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            greeting: greeting.into(),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Run `f` against the session for `key`, creating it on first use.
    pub async fn with_session<R>(
        &self,
        key: &SessionKey,
        f: impl FnOnce(&mut ChatSession) -> R,
    ) -> R {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.entry(key.clone()).or_insert_with(|| {
            debug!(channel = %key.channel, user = %key.user_id, "Opening chat session");
            ChatSession::new(self.greeting.clone())
        });
        f(session)
    }

    pub async fn count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Drop sessions with no activity for longer than `idle_timeout`.
    /// Returns how many were removed.
    pub async fn prune_stale_sessions(&self, idle_timeout: Duration) -> usize {
        let Some(cutoff) = chrono::Duration::from_std(idle_timeout)
            .ok()
            .and_then(|idle| Utc::now().checked_sub_signed(idle))
        else {
            return 0;
        };

        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.last_active() >= cutoff);
        let pruned = before - sessions.len();
        if pruned > 0 {
            debug!(pruned, remaining = sessions.len(), "Pruned idle chat sessions");
        }
        pruned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::ConversationSurface;
    use crate::responder::ResponseMatcher;

    #[tokio::test]
    async fn sessions_are_created_once_per_key() {
        let mgr = SessionManager::new("hello");
        let matcher = ResponseMatcher::default();
        let key = SessionKey::new("cli", "local-user", None);

        mgr.with_session(&key, |s| s.submit(&matcher, "price")).await;
        let turns = mgr.with_session(&key, |s| s.turns().len()).await;

        assert_eq!(turns, 3);
        assert_eq!(mgr.count().await, 1);
    }

    #[tokio::test]
    async fn threads_get_separate_sessions() {
        let mgr = SessionManager::new("hello");
        let a = SessionKey::new("web", "web-user", Some("a"));
        let b = SessionKey::new("web", "web-user", Some("b"));

        mgr.with_session(&a, |s| s.toggle_open()).await;
        let b_open = mgr.with_session(&b, |s| s.is_open()).await;
        let a_open = mgr.with_session(&a, |s| s.is_open()).await;

        assert!(a_open);
        assert!(!b_open);
        assert_eq!(mgr.count().await, 2);
    }

    #[tokio::test]
    async fn prune_drops_idle_sessions_only() {
        let mgr = SessionManager::new("hello");
        let key = SessionKey::new("cli", "u", None);
        mgr.with_session(&key, |_| ()).await;

        assert_eq!(mgr.prune_stale_sessions(Duration::from_secs(3600)).await, 0);
        assert_eq!(mgr.count().await, 1);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(mgr.prune_stale_sessions(Duration::from_millis(1)).await, 1);
        assert_eq!(mgr.count().await, 0);
    }
}
