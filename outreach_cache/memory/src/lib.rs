use std::{collections::HashMap, fmt::Debug, sync::Arc, time::Duration};

use anyhow::Context;
use outreach_cache_contracts::CacheService;
use outreach_utils::trace_instrument;
use serde::{de::DeserializeOwned, Serialize};
use tokio::{sync::RwLock, task::JoinHandle, time::Instant};
use tracing::debug;

/// In-process cache, shared between clones.
///
/// Expired entries are never returned, but they are only freed by
/// [`MemoryCache::sweep`], either called directly or periodically via
/// [`MemoryCache::spawn_sweeper`].
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

#[derive(Debug)]
struct Entry {
    data: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes all expired entries and returns how many were removed.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Runs [`MemoryCache::sweep`] every `interval` until the returned task is
    /// aborted.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = cache.sweep().await;
                if removed > 0 {
                    debug!(removed, "swept expired cache entries");
                }
            }
        })
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl CacheService for MemoryCache {
    #[trace_instrument(skip(self))]
    async fn get<T: DeserializeOwned + Debug + 'static>(
        &self,
        key: &str,
    ) -> anyhow::Result<Option<T>> {
        let entries = self.entries.read().await;
        let Some(entry) = entries
            .get(key)
            .filter(|entry| !entry.is_expired(Instant::now()))
        else {
            return Ok(None);
        };

        serde_json::from_slice(&entry.data)
            .map(Some)
            .context("Failed to deserialize cached value")
    }

    #[trace_instrument(skip(self))]
    async fn set<T: Serialize + Debug + Sync + 'static>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> anyhow::Result<()> {
        let data = serde_json::to_vec(value).context("Failed to serialize value")?;
        let entry = Entry {
            data,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };

        self.entries.write().await.insert(key.into(), entry);

        Ok(())
    }

    #[trace_instrument(skip(self))]
    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_overwrite() {
        let sut = MemoryCache::new();

        sut.set("key", &vec![1, 2, 3], None).await.unwrap();
        assert_eq!(sut.get::<Vec<i32>>("key").await.unwrap(), Some(vec![1, 2, 3]));

        sut.set("key", &vec![4, 2], None).await.unwrap();
        assert_eq!(sut.get::<Vec<i32>>("key").await.unwrap(), Some(vec![4, 2]));
    }

    #[tokio::test]
    async fn get_missing() {
        let sut = MemoryCache::new();

        let result = sut.get::<String>("missing").await.unwrap();

        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn get_wrong_type() {
        let sut = MemoryCache::new();
        sut.set("key", &"text", None).await.unwrap();

        let result = sut.get::<u64>("key").await;

        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn expires_after_ttl() {
        let sut = MemoryCache::new();
        sut.set("key", &42u64, Some(Duration::from_secs(60)))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(sut.get::<u64>("key").await.unwrap(), Some(42));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(sut.get::<u64>("key").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn sweep() {
        let sut = MemoryCache::new();
        sut.set("short", &1u64, Some(Duration::from_secs(10)))
            .await
            .unwrap();
        sut.set("long", &2u64, Some(Duration::from_secs(100)))
            .await
            .unwrap();
        sut.set("forever", &3u64, None).await.unwrap();

        tokio::time::advance(Duration::from_secs(30)).await;
        let removed = sut.sweep().await;

        assert_eq!(removed, 1);
        assert_eq!(sut.len().await, 2);
        assert_eq!(sut.get::<u64>("long").await.unwrap(), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_task() {
        let sut = MemoryCache::new();
        sut.set("key", &1u64, Some(Duration::from_secs(5)))
            .await
            .unwrap();

        let handle = sut.spawn_sweeper(Duration::from_secs(10));
        tokio::time::sleep(Duration::from_secs(11)).await;

        assert!(sut.is_empty().await);
        handle.abort();
    }
}
