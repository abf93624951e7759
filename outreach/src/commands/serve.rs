use outreach_cache_contracts::CacheService;
use outreach_config::Config;
use outreach_email_contracts::EmailService;
use tracing::{info, warn};

use crate::{
    cache, email,
    environment::{ConfigProvider, Provider},
};

pub async fn serve(config: Config) -> anyhow::Result<()> {
    info!("Connecting to cache");
    let cache = cache::connect(&config.cache).await?;
    cache.ping().await?;

    info!("Setting up mail transport");
    let email = email::connect(&config.email)?;
    if let Err(err) = email.ping().await {
        warn!("Mail transport is not available: {err:#}");
    }

    let provider = Provider::new(ConfigProvider::new(&config), cache, email);
    let server = provider.rest_server();
    info!("Starting http server on {}", config.http.address);
    server.serve().await
}
