use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;
use tracing::debug;

/// CID pair of the most recent analyzed submission for a session,
/// retained so a failed proposal creation can be retried with a fresh
/// description.
#[derive(Debug, Clone)]
pub struct StoredSubmission {
    pub image_cid: String,
    pub analysis_cid: String,
    pub stored_at: DateTime<Utc>,
}

/// Short-lived per-session state. Keyed by an opaque session id so the
/// in-memory implementation can be swapped for a persistent one without
/// touching call sites.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn put(&self, session_id: &str, value: StoredSubmission);
    async fn get(&self, session_id: &str) -> Option<StoredSubmission>;
    async fn remove(&self, session_id: &str);
}

pub struct InMemorySessionStore {
    ttl: Duration,
    entries: RwLock<HashMap<String, (Instant, StoredSubmission)>>,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Drops expired entries. `get` already refuses them; this reclaims
    /// the memory.
    pub async fn sweep(&self) {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, (inserted, _)| inserted.elapsed() < self.ttl);
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!(evicted, remaining = entries.len(), "Swept expired sessions");
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn put(&self, session_id: &str, value: StoredSubmission) {
        self.entries
            .write()
            .await
            .insert(session_id.to_string(), (Instant::now(), value));
    }

    async fn get(&self, session_id: &str) -> Option<StoredSubmission> {
        let entries = self.entries.read().await;
        let (inserted, value) = entries.get(session_id)?;
        if inserted.elapsed() >= self.ttl {
            return None;
        }
        Some(value.clone())
    }

    async fn remove(&self, session_id: &str) {
        self.entries.write().await.remove(session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> StoredSubmission {
        StoredSubmission {
            image_cid: "QmImg".to_string(),
            analysis_cid: "QmAnalysis".to_string(),
            stored_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn put_get_roundtrip() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));
        store.put("chat-1", submission()).await;

        let stored = store.get("chat-1").await.unwrap();
        assert_eq!(stored.image_cid, "QmImg");
        assert_eq!(stored.analysis_cid, "QmAnalysis");
        assert!(store.get("chat-2").await.is_none());
    }

    #[tokio::test]
    async fn remove_discards_the_entry() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));
        store.put("chat-1", submission()).await;
        store.remove("chat-1").await;

        assert!(store.get("chat-1").await.is_none());
    }

    #[tokio::test]
    async fn expired_entries_are_not_returned() {
        let store = InMemorySessionStore::new(Duration::ZERO);
        store.put("chat-1", submission()).await;

        assert!(store.get("chat-1").await.is_none());
        // Entry is still occupying memory until swept
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn sweep_reclaims_expired_entries() {
        let store = InMemorySessionStore::new(Duration::ZERO);
        store.put("chat-1", submission()).await;
        store.put("chat-2", submission()).await;

        store.sweep().await;
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn overwrite_refreshes_the_entry() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));
        store.put("chat-1", submission()).await;
        let mut updated = submission();
        updated.image_cid = "QmOther".to_string();
        store.put("chat-1", updated).await;

        assert_eq!(store.get("chat-1").await.unwrap().image_cid, "QmOther");
        assert_eq!(store.len().await, 1);
    }
}
