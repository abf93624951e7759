use std::{fmt::Debug, time::Duration};

use anyhow::Context;
use bb8_redis::{
    bb8::{Pool, PooledConnection},
    redis::{self, AsyncCommands},
    RedisConnectionManager,
};
use outreach_cache_contracts::CacheService;
use outreach_utils::trace_instrument;
use serde::{de::DeserializeOwned, Serialize};

/// Cache backed by a Valkey (or Redis) server.
///
/// Values are encoded with MessagePack and stored under
/// `{key_prefix}{key}`.
#[derive(Debug, Clone)]
pub struct ValkeyCache {
    pool: Pool<RedisConnectionManager>,
    key_prefix: String,
}

#[derive(Debug)]
pub struct ValkeyCacheConfig {
    pub url: String,
    pub key_prefix: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
}

impl ValkeyCache {
    pub async fn connect(config: &ValkeyCacheConfig) -> anyhow::Result<Self> {
        let manager = RedisConnectionManager::new(config.url.as_str())
            .context("Invalid valkey url")?;
        let pool = Pool::builder()
            .max_size(config.max_connections)
            .min_idle(config.min_connections)
            .connection_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .build(manager)
            .await
            .context("Failed to create valkey connection pool")?;

        Ok(Self {
            pool,
            key_prefix: config.key_prefix.clone(),
        })
    }

    async fn conn(&self) -> anyhow::Result<PooledConnection<'_, RedisConnectionManager>> {
        self.pool
            .get()
            .await
            .context("Failed to acquire cache connection")
    }

    fn key(&self, key: &str) -> String {
        format!("{}{key}", self.key_prefix)
    }
}

impl CacheService for ValkeyCache {
    #[trace_instrument(skip(self))]
    async fn get<T: DeserializeOwned + Debug + 'static>(
        &self,
        key: &str,
    ) -> anyhow::Result<Option<T>> {
        let data = self
            .conn()
            .await?
            .get::<_, Option<Vec<u8>>>(self.key(key))
            .await
            .context("Failed to read value from cache")?;

        data.map(|data| rmp_serde::from_slice(&data))
            .transpose()
            .context("Failed to deserialize cached value")
    }

    #[trace_instrument(skip(self))]
    async fn set<T: Serialize + Debug + Sync + 'static>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> anyhow::Result<()> {
        let data = rmp_serde::to_vec(value).context("Failed to serialize value")?;
        let key = self.key(key);
        let mut conn = self.conn().await?;

        match ttl {
            Some(ttl) => {
                let millis = ttl.as_millis().try_into().context("Cache ttl too large")?;
                conn.pset_ex::<_, _, ()>(key, data, millis).await
            }
            None => conn.set::<_, _, ()>(key, data).await,
        }
        .context("Failed to write value to cache")
    }

    #[trace_instrument(skip(self))]
    async fn ping(&self) -> anyhow::Result<()> {
        let mut conn = self.conn().await?;
        redis::cmd("PING")
            .query_async::<()>(&mut *conn)
            .await
            .context("Failed to ping cache")
    }
}
