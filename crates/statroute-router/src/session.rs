// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-local session history.

use std::collections::HashMap;

use async_trait::async_trait;
use statroute_core::{HistoryMessage, SessionId, SessionStore};
use tokio::sync::Mutex;

/// In-memory [`SessionStore`] that keeps the most recent `max_messages`
/// entries per session. Lost on restart.
#[derive(Debug)]
pub struct InMemorySessionStore {
    max_messages: usize,
    sessions: Mutex<HashMap<SessionId, Vec<HistoryMessage>>>,
}

impl InMemorySessionStore {
    pub fn new(max_messages: usize) -> Self {
        Self {
            max_messages,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Number of sessions currently held.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, session: &SessionId) -> Vec<HistoryMessage> {
        self.sessions
            .lock()
            .await
            .get(session)
            .cloned()
            .unwrap_or_default()
    }

    async fn put(&self, session: &SessionId, mut history: Vec<HistoryMessage>) {
        if history.len() > self.max_messages {
            history.drain(..history.len() - self.max_messages);
        }
        self.sessions.lock().await.insert(session.clone(), history);
    }

    async fn evict(&self, session: &SessionId) {
        self.sessions.lock().await.remove(session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid(s: &str) -> SessionId {
        SessionId(s.to_string())
    }

    #[tokio::test]
    async fn unknown_session_is_empty() {
        let store = InMemorySessionStore::new(4);
        assert!(store.get(&sid("nope")).await.is_empty());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn put_truncates_to_most_recent() {
        let store = InMemorySessionStore::new(3);
        let history = (0..5)
            .map(|i| HistoryMessage::user(format!("m{i}")))
            .collect::<Vec<_>>();
        store.put(&sid("s"), history).await;

        let kept = store.get(&sid("s")).await;
        let contents: Vec<&str> = kept.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m2", "m3", "m4"]);
    }

    #[tokio::test]
    async fn evict_and_isolation() {
        let store = InMemorySessionStore::new(10);
        store.put(&sid("a"), vec![HistoryMessage::user("hi")]).await;
        store.put(&sid("b"), vec![HistoryMessage::assistant("yo")]).await;
        assert_eq!(store.len().await, 2);

        store.evict(&sid("a")).await;
        assert!(store.get(&sid("a")).await.is_empty());
        assert_eq!(store.get(&sid("b")).await.len(), 1);
    }
}
