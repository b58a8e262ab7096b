// SPDX-FileCopyrightText: 2026 Statroute Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session history store trait.

use async_trait::async_trait;

use crate::types::{HistoryMessage, SessionId};

/// Backing store for per-session conversation history.
///
/// History is ephemeral by contract; implementations are free to lose it
/// on restart. Concurrent writes to the same session are last-write-wins.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the stored history, or an empty list for unknown sessions.
    async fn get(&self, session: &SessionId) -> Vec<HistoryMessage>;

    /// Replaces the stored history for a session.
    async fn put(&self, session: &SessionId, history: Vec<HistoryMessage>);

    /// Drops a session's history.
    async fn evict(&self, session: &SessionId);
}
