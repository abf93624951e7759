use std::future::Future;

use chrono::{DateTime, Utc};

/// Append-only record of delivered contact messages.
///
/// Only the organization name is recorded, no other personal data.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait SubmissionLogRepository: Send + Sync + 'static {
    /// Appends an entry for a message from `organization` sent at
    /// `timestamp`.
    fn record(
        &self,
        organization: &str,
        timestamp: DateTime<Utc>,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;
}

#[cfg(feature = "mock")]
impl MockSubmissionLogRepository {
    pub fn with_record(mut self, organization: String, timestamp: DateTime<Utc>) -> Self {
        self.expect_record()
            .once()
            .with(
                mockall::predicate::eq(organization),
                mockall::predicate::eq(timestamp),
            )
            .return_once(|_, _| Box::pin(std::future::ready(Ok(()))));
        self
    }

    pub fn with_record_error(mut self) -> Self {
        self.expect_record().once().return_once(|_, _| {
            Box::pin(std::future::ready(Err(anyhow::anyhow!(
                "Permission denied (os error 13)"
            ))))
        });
        self
    }
}
