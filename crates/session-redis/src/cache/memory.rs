//! In-process store with Redis-like expiry, for tests and single-node setups.
//!
//! Expired keys are dropped when read, swept opportunistically on writes at
//! most once per sweep interval, and can be swept on a timer with
//! [`MemoryStore::spawn_sweeper`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::debug;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

use session_core::SessionError;

use super::KeyValueStore;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(at) if at <= now)
    }
}

/// Cloning shares the underlying map.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, Entry>>,
    next_sweep: Arc<Mutex<Instant>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            next_sweep: Arc::new(Mutex::new(Instant::now() + SWEEP_INTERVAL)),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every expired entry. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let purged = before.saturating_sub(self.entries.len());
        if purged > 0 {
            debug!("Purged {} expired session entries", purged);
        }
        purged
    }

    /// Purge expired entries every `period` until the store's last clone is
    /// dropped or the handle is aborted.
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let entries = Arc::downgrade(&self.entries);
        let next_sweep = Arc::clone(&self.next_sweep);
        tokio::spawn(async move {
            loop {
                sleep(period).await;
                let Some(entries) = entries.upgrade() else {
                    break;
                };
                let store = MemoryStore {
                    entries,
                    next_sweep: Arc::clone(&next_sweep),
                };
                store.purge_expired();
            }
        })
    }

    /// Sweep if the interval has passed. Skips when another task is sweeping.
    fn maybe_sweep(&self) {
        let Ok(mut next) = self.next_sweep.try_lock() else {
            return;
        };
        let now = Instant::now();
        if now < *next {
            return;
        }
        *next = now + SWEEP_INTERVAL;
        drop(next);
        self.purge_expired();
    }

    /// Number of stored keys, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remaining lifetime of a live key. `None` for missing, expired or
    /// persistent keys.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let entry = self.entries.get(key)?;
        let at = entry.expires_at?;
        at.checked_duration_since(Instant::now())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn set(&self, key: &str, value: String, ttl_secs: Option<u64>) -> Result<(), SessionError> {
        self.maybe_sweep();
        if ttl_secs == Some(0) {
            self.entries.remove(key);
            return Ok(());
        }
        let expires_at = ttl_secs.map(|secs| Instant::now() + Duration::from_secs(secs));
        self.entries
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let Some(entry) = self.entries.get(key) else {
            return Ok(None);
        };
        if entry.is_expired(Instant::now()) {
            drop(entry);
            self.entries.remove(key);
            return Ok(None);
        }
        Ok(Some(entry.value.clone()))
    }

    async fn del(&self, key: &str) -> Result<(), SessionError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_del() {
        let store = MemoryStore::new();
        store.set("a", "1".into(), None).await.unwrap();
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(store.ttl("a"), None);

        store.set("a", "2".into(), None).await.unwrap();
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("2"));

        store.del("a").await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), None);
        store.del("a").await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() {
        let store = MemoryStore::new();
        store.set("k", "v".into(), Some(10)).await.unwrap();
        assert_eq!(store.ttl("k"), Some(Duration::from_secs(10)));

        tokio::time::advance(Duration::from_secs(9)).await;
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_zero_ttl_removes_key() {
        let store = MemoryStore::new();
        store.set("k", "v".into(), None).await.unwrap();
        store.set("k", "w".into(), Some(0)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
        assert_eq!(store.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_entries_are_swept_on_write() {
        let store = MemoryStore::new();
        for i in 0..1000 {
            store.set(&format!("s{}", i), "v".into(), Some(1)).await.unwrap();
        }
        store.set("keep", "v".into(), None).await.unwrap();
        assert_eq!(store.len(), 1001);

        tokio::time::advance(Duration::from_secs(3600)).await;
        store.set("fresh", "v".into(), Some(60)).await.unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("keep").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired_keeps_live_entries() {
        let store = MemoryStore::new();
        store.set("short", "v".into(), Some(5)).await.unwrap();
        store.set("long", "v".into(), Some(500)).await.unwrap();

        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.ttl("long").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_runs_on_interval() {
        let store = MemoryStore::new();
        let sweeper = store.spawn_sweeper(Duration::from_secs(30));
        store.set("k", "v".into(), Some(10)).await.unwrap();

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(store.is_empty());
        sweeper.abort();
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("k", "v".into(), None).await.unwrap();
        assert_eq!(other.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
