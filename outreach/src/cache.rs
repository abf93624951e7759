use std::fmt::Debug;

use anyhow::Context;
use outreach_cache_contracts::CacheService;
use outreach_cache_memory::MemoryCache;
use outreach_cache_valkey::{ValkeyCache, ValkeyCacheConfig};
use outreach_config::CacheConfig;
use serde::{de::DeserializeOwned, Serialize};

/// The cache backend selected by the configuration.
#[derive(Debug, Clone)]
pub enum Cache {
    Memory(MemoryCache),
    Valkey(ValkeyCache),
}

/// Connect to the configured cache backend
pub async fn connect(config: &CacheConfig) -> anyhow::Result<Cache> {
    match config {
        CacheConfig::Memory { sweep_interval } => {
            let cache = MemoryCache::new();
            if let Some(interval) = sweep_interval {
                cache.spawn_sweeper((*interval).into());
            }
            Ok(Cache::Memory(cache))
        }
        CacheConfig::Valkey(config) => ValkeyCache::connect(&ValkeyCacheConfig {
            url: config.url.clone(),
            key_prefix: config.key_prefix.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            acquire_timeout: config.acquire_timeout.into(),
            idle_timeout: config.idle_timeout.map(Into::into),
            max_lifetime: config.max_lifetime.map(Into::into),
        })
        .await
        .map(Cache::Valkey)
        .context("Failed to connect to valkey"),
    }
}

impl CacheService for Cache {
    async fn get<T: DeserializeOwned + Debug + 'static>(
        &self,
        key: &str,
    ) -> anyhow::Result<Option<T>> {
        match self {
            Self::Memory(cache) => cache.get(key).await,
            Self::Valkey(cache) => cache.get(key).await,
        }
    }

    async fn set<T: Serialize + Debug + Sync + 'static>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<std::time::Duration>,
    ) -> anyhow::Result<()> {
        match self {
            Self::Memory(cache) => cache.set(key, value, ttl).await,
            Self::Valkey(cache) => cache.set(key, value, ttl).await,
        }
    }

    async fn ping(&self) -> anyhow::Result<()> {
        match self {
            Self::Memory(cache) => cache.ping().await,
            Self::Valkey(cache) => cache.ping().await,
        }
    }
}
