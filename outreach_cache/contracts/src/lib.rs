use std::{fmt::Debug, future::Future, time::Duration};

use serde::{de::DeserializeOwned, Serialize};

/// Keyed store for short-lived values, such as rate limit windows.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait CacheService: Send + Sync + 'static {
    /// Returns the value stored under `key`, or `None` if there is none or it
    /// has expired.
    fn get<T: DeserializeOwned + Debug + 'static>(
        &self,
        key: &str,
    ) -> impl Future<Output = anyhow::Result<Option<T>>> + Send;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// With a `ttl` the value expires after that duration, otherwise it is
    /// kept until overwritten.
    fn set<T: Serialize + Debug + Sync + 'static>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// Checks that the cache is reachable.
    fn ping(&self) -> impl Future<Output = anyhow::Result<()>> + Send;
}

#[cfg(feature = "mock")]
impl MockCacheService {
    pub fn with_get<T: DeserializeOwned + Debug + Send + 'static>(
        mut self,
        key: String,
        result: Option<T>,
    ) -> Self {
        self.expect_get()
            .once()
            .with(mockall::predicate::eq(key))
            .return_once(|_| Box::pin(std::future::ready(Ok(result))));
        self
    }

    pub fn with_set<T: Debug + PartialEq + Serialize + Send + Sync + 'static>(
        mut self,
        key: String,
        value: T,
        ttl: Option<Duration>,
    ) -> Self {
        self.expect_set()
            .once()
            .with(
                mockall::predicate::eq(key),
                mockall::predicate::eq(value),
                mockall::predicate::eq(ttl),
            )
            .return_once(|_, _, _| Box::pin(std::future::ready(Ok(()))));
        self
    }

    pub fn with_ping(mut self, ok: bool) -> Self {
        self.expect_ping().once().return_once(move || {
            Box::pin(std::future::ready(if ok {
                Ok(())
            } else {
                Err(anyhow::anyhow!("cache unreachable"))
            }))
        });
        self
    }
}
