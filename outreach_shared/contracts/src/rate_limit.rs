use std::future::Future;

use chrono::{DateTime, Utc};

/// Sliding-window limit on the number of accepted attempts per caller.
///
/// Implementations read the caller's window, compact it and write it back
/// in separate steps. Two concurrent checks for the same caller may both be
/// allowed even if only one slot is left.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait RateLimitService: Send + Sync + 'static {
    /// Checks whether `caller` may make another attempt at `now`.
    ///
    /// Allowed attempts are recorded, rejected ones are not.
    fn check(
        &self,
        caller: &str,
        now: DateTime<Utc>,
    ) -> impl Future<Output = anyhow::Result<RateLimitDecision>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited,
}

#[cfg(feature = "mock")]
impl MockRateLimitService {
    pub fn with_check(
        mut self,
        caller: String,
        now: DateTime<Utc>,
        result: RateLimitDecision,
    ) -> Self {
        self.expect_check()
            .once()
            .with(mockall::predicate::eq(caller), mockall::predicate::eq(now))
            .return_once(move |_, _| Box::pin(std::future::ready(Ok(result))));
        self
    }
}
