use chrono::{DateTime, Utc};
use outreach_shared_contracts::time::TimeService;
use outreach_utils::trace_instrument;

#[derive(Debug, Clone, Copy, Default)]
pub struct TimeServiceImpl;

impl TimeService for TimeServiceImpl {
    #[trace_instrument(skip(self))]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
