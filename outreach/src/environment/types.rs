use outreach_core_contact_impl::ContactServiceImpl;
use outreach_core_health_impl::HealthFeatureServiceImpl;
use outreach_email_impl::EmailServiceImpl;
use outreach_persistence_file::FileSubmissionLog;
use outreach_shared_impl::{
    hash::HashServiceImpl, rate_limit::RateLimitServiceImpl, time::TimeServiceImpl,
};

// API
pub type RestServer<Email = EmailServiceImpl> =
    outreach_api_rest::RestServer<HealthFeature<Email>, ContactFeature<Email>>;

// Persistence
pub type Cache = crate::cache::Cache;
pub type SubmissionLog = FileSubmissionLog;

// Shared
pub type Time = TimeServiceImpl;
pub type Hash = HashServiceImpl;
pub type RateLimit = RateLimitServiceImpl<Hash, Cache>;

// Core
pub type ContactFeature<Email = EmailServiceImpl> =
    ContactServiceImpl<Time, RateLimit, Email, SubmissionLog>;
pub type HealthFeature<Email = EmailServiceImpl> = HealthFeatureServiceImpl<Time, Cache, Email>;
