use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use outreach_cache_contracts::CacheService;
use outreach_core_health_contracts::{HealthFeatureService, HealthStatus};
use outreach_email_contracts::EmailService;
use outreach_shared_contracts::time::TimeService;
use tokio::sync::RwLock;
use tracing::error;

#[derive(Debug, Clone)]
pub struct HealthFeatureServiceImpl<Time, Cache, Email> {
    time: Time,
    cache: Cache,
    email: Email,
    config: HealthFeatureConfig,
    state: Arc<State>,
}

#[derive(Debug, Clone)]
pub struct HealthFeatureConfig {
    pub cache_ttl: Duration,
}

#[derive(Debug, Default)]
struct State {
    cache: RwLock<Option<CachedStatus>>,
}

#[derive(Debug)]
struct CachedStatus {
    status: HealthStatus,
    timestamp: DateTime<Utc>,
}

impl<Time, Cache, Email> HealthFeatureServiceImpl<Time, Cache, Email> {
    pub fn new(time: Time, cache: Cache, email: Email, config: HealthFeatureConfig) -> Self {
        Self {
            time,
            cache,
            email,
            config,
            state: Default::default(),
        }
    }

    fn fresh(&self, cached: &Option<CachedStatus>, now: DateTime<Utc>) -> Option<HealthStatus> {
        cached
            .as_ref()
            .filter(|c| now < c.timestamp + self.config.cache_ttl)
            .map(|c| c.status)
    }
}

impl<Time, Cache, Email> HealthFeatureService for HealthFeatureServiceImpl<Time, Cache, Email>
where
    Time: TimeService,
    Cache: CacheService,
    Email: EmailService,
{
    async fn get_status(&self) -> HealthStatus {
        let now = self.time.now();
        if let Some(status) = self.fresh(&*self.state.cache.read().await, now) {
            return status;
        }

        let mut cache_guard = self.state.cache.write().await;
        if let Some(status) = self.fresh(&cache_guard, now) {
            return status;
        }

        let cache = self
            .cache
            .ping()
            .await
            .inspect_err(|err| error!("Failed to ping cache: {err}"))
            .is_ok();

        let email = self
            .email
            .ping()
            .await
            .inspect_err(|err| error!("Failed to ping mail transport: {err}"))
            .is_ok();

        let status = HealthStatus { cache, email };

        cache_guard
            .insert(CachedStatus {
                status,
                timestamp: now,
            })
            .status
    }
}
