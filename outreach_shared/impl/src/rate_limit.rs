use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use outreach_cache_contracts::CacheService;
use outreach_shared_contracts::{
    hash::HashService,
    rate_limit::{RateLimitDecision, RateLimitService},
};
use outreach_utils::trace_instrument;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct RateLimitServiceImpl<Hash, Cache> {
    hash: Hash,
    cache: Cache,
    config: RateLimitServiceConfig,
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitServiceConfig {
    /// Maximum number of accepted attempts per caller within `period`.
    pub limit: usize,
    pub period: Duration,
}

impl Default for RateLimitServiceConfig {
    fn default() -> Self {
        Self {
            limit: 5,
            period: Duration::from_secs(3600),
        }
    }
}

impl<Hash, Cache> RateLimitServiceImpl<Hash, Cache> {
    pub fn new(hash: Hash, cache: Cache, config: RateLimitServiceConfig) -> Self {
        Self {
            hash,
            cache,
            config,
        }
    }
}

impl<Hash, Cache> RateLimitService for RateLimitServiceImpl<Hash, Cache>
where
    Hash: HashService,
    Cache: CacheService,
{
    #[trace_instrument(skip(self))]
    async fn check(&self, caller: &str, now: DateTime<Utc>) -> anyhow::Result<RateLimitDecision> {
        let cache_key = self.cache_key(caller);
        let now = now.timestamp();
        let period = i64::try_from(self.config.period.as_secs()).unwrap_or(i64::MAX);

        let mut window = self
            .cache
            .get::<Vec<i64>>(&cache_key)
            .await
            .context("Failed to load rate limit window")?
            .unwrap_or_default();

        window.retain(|&timestamp| now.saturating_sub(timestamp) < period);

        if window.len() >= self.config.limit {
            debug!(attempts = window.len(), "rate limit exceeded");
            return Ok(RateLimitDecision::Limited);
        }

        window.push(now);
        self.cache
            .set(&cache_key, &window, Some(self.config.period))
            .await
            .context("Failed to save rate limit window")?;

        Ok(RateLimitDecision::Allowed)
    }
}

impl<Hash, Cache> RateLimitServiceImpl<Hash, Cache>
where
    Hash: HashService,
{
    fn cache_key(&self, caller: &str) -> String {
        let hash = self.hash.sha256(caller.as_bytes());
        format!("contact_rate:{hash}")
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use chrono::TimeDelta;
    use outreach_cache_contracts::MockCacheService;
    use outreach_cache_memory::MemoryCache;
    use outreach_models::Sha256Hash;
    use outreach_shared_contracts::hash::MockHashService;

    use super::*;
    use crate::hash::HashServiceImpl;

    const HASH: Sha256Hash = Sha256Hash([0xab; 32]);

    fn cache_key() -> String {
        format!("contact_rate:{}", hex::encode([0xab; 32]))
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn hash() -> MockHashService {
        MockHashService::new().with_sha256(b"10.0.0.1".to_vec(), HASH)
    }

    #[tokio::test]
    async fn first_attempt() {
        // Arrange
        let cache = MockCacheService::new()
            .with_get::<Vec<i64>>(cache_key(), None)
            .with_set(
                cache_key(),
                vec![now().timestamp()],
                Some(Duration::from_secs(3600)),
            );

        let sut = RateLimitServiceImpl::new(hash(), cache, Default::default());

        // Act
        let result = sut.check("10.0.0.1", now()).await;

        // Assert
        assert_eq!(result.unwrap(), RateLimitDecision::Allowed);
    }

    #[tokio::test]
    async fn expired_attempts_are_dropped() {
        // Arrange
        let now = now().timestamp();
        let cache = MockCacheService::new()
            .with_get(
                cache_key(),
                Some(vec![now - 7200, now - 3600, now - 3599, now - 10]),
            )
            .with_set(
                cache_key(),
                vec![now - 3599, now - 10, now],
                Some(Duration::from_secs(3600)),
            );

        let sut = RateLimitServiceImpl::new(hash(), cache, Default::default());

        // Act
        let result = sut.check("10.0.0.1", self::now()).await;

        // Assert
        assert_eq!(result.unwrap(), RateLimitDecision::Allowed);
    }

    #[tokio::test]
    async fn limited_attempts_are_not_recorded() {
        // Arrange
        let now = now().timestamp();
        let cache = MockCacheService::new().with_get(
            cache_key(),
            Some(vec![now - 50, now - 40, now - 30, now - 20, now - 10]),
        );

        let sut = RateLimitServiceImpl::new(hash(), cache, Default::default());

        // Act
        let result = sut.check("10.0.0.1", self::now()).await;

        // Assert
        assert_eq!(result.unwrap(), RateLimitDecision::Limited);
    }

    #[tokio::test]
    async fn window_slides() {
        // Arrange
        let sut = RateLimitServiceImpl::new(
            HashServiceImpl,
            MemoryCache::new(),
            RateLimitServiceConfig {
                limit: 5,
                period: Duration::from_secs(3600),
            },
        );
        let caller = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 7)).to_string();
        let start = now();

        // Act + Assert
        for minute in 0..5 {
            let result = sut
                .check(&caller, start + TimeDelta::minutes(minute))
                .await
                .unwrap();
            assert_eq!(result, RateLimitDecision::Allowed, "attempt {minute}");
        }

        let result = sut
            .check(&caller, start + TimeDelta::minutes(30))
            .await
            .unwrap();
        assert_eq!(result, RateLimitDecision::Limited);

        let result = sut.check("192.0.2.8", start + TimeDelta::minutes(30)).await;
        assert_eq!(result.unwrap(), RateLimitDecision::Allowed);

        let result = sut
            .check(&caller, start + TimeDelta::seconds(3601))
            .await
            .unwrap();
        assert_eq!(result, RateLimitDecision::Allowed);
    }

    #[tokio::test]
    async fn custom_limit() {
        let sut = RateLimitServiceImpl::new(
            HashServiceImpl,
            MemoryCache::new(),
            RateLimitServiceConfig {
                limit: 1,
                period: Duration::from_secs(60),
            },
        );

        assert_eq!(
            sut.check("a", now()).await.unwrap(),
            RateLimitDecision::Allowed
        );
        assert_eq!(
            sut.check("a", now() + TimeDelta::seconds(59)).await.unwrap(),
            RateLimitDecision::Limited
        );
        assert_eq!(
            sut.check("a", now() + TimeDelta::seconds(60)).await.unwrap(),
            RateLimitDecision::Allowed
        );
    }
}
