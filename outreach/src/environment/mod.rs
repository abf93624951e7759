use std::sync::Arc;

use outreach_api_rest::{RestServerConfig, RestServerRealIpConfig};
use outreach_config::Config;
use outreach_core_contact_impl::{ContactServiceConfig, ContactServiceImpl};
use outreach_core_health_impl::{HealthFeatureConfig, HealthFeatureServiceImpl};
use outreach_email_contracts::EmailService;
use outreach_email_impl::EmailServiceImpl;
use outreach_persistence_file::FileSubmissionLog;
use outreach_shared_impl::{
    hash::HashServiceImpl,
    rate_limit::{RateLimitServiceConfig, RateLimitServiceImpl},
    time::TimeServiceImpl,
};
use types::{Cache, ContactFeature, HealthFeature, RateLimit, RestServer};

pub mod types;

/// Wires the services together, given the connected infrastructure.
#[derive(Debug, Clone)]
pub struct Provider<Email = EmailServiceImpl> {
    config: ConfigProvider,
    cache: Cache,
    email: Email,
}

impl<Email> Provider<Email>
where
    Email: EmailService + Clone,
{
    pub fn new(config: ConfigProvider, cache: Cache, email: Email) -> Self {
        Self {
            config,
            cache,
            email,
        }
    }

    pub fn rest_server(&self) -> RestServer<Email> {
        outreach_api_rest::RestServer::new(
            self.health_feature(),
            self.contact_feature(),
            self.config.rest_server_config.clone(),
        )
    }

    pub fn contact_feature(&self) -> ContactFeature<Email> {
        ContactServiceImpl::new(
            TimeServiceImpl,
            self.rate_limit(),
            self.email.clone(),
            FileSubmissionLog::new(&self.config.submission_log_path),
            self.config.contact_service_config.clone(),
        )
    }

    pub fn health_feature(&self) -> HealthFeature<Email> {
        HealthFeatureServiceImpl::new(
            TimeServiceImpl,
            self.cache.clone(),
            self.email.clone(),
            self.config.health_feature_config.clone(),
        )
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimitServiceImpl::new(
            HashServiceImpl,
            self.cache.clone(),
            self.config.rate_limit_service_config,
        )
    }
}

/// Service configurations derived from the [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigProvider {
    // API
    pub rest_server_config: RestServerConfig,

    // Shared
    pub rate_limit_service_config: RateLimitServiceConfig,

    // Core
    pub contact_service_config: ContactServiceConfig,
    pub health_feature_config: HealthFeatureConfig,

    // Persistence
    pub submission_log_path: std::path::PathBuf,
}

impl ConfigProvider {
    pub fn new(config: &Config) -> Self {
        // API
        let rest_server_config = RestServerConfig {
            addr: config.http.address,
            real_ip_config: config.http.real_ip.as_ref().map(|real_ip_config| {
                Arc::new(RestServerRealIpConfig {
                    header: real_ip_config.header.clone(),
                    set_from: real_ip_config.set_from,
                })
            }),
            static_dir: config.http.static_dir.clone(),
        };

        // Shared
        let rate_limit_service_config = RateLimitServiceConfig {
            limit: config.contact.rate_limit,
            period: config.contact.rate_period.into(),
        };

        // Core
        let contact_service_config = ContactServiceConfig {
            recipient: config.contact.recipient.clone(),
        };

        let health_feature_config = HealthFeatureConfig {
            cache_ttl: config.health.cache_ttl.into(),
        };

        Self {
            rest_server_config,
            rate_limit_service_config,
            contact_service_config,
            health_feature_config,
            submission_log_path: config.contact.log_path.clone(),
        }
    }
}
