use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    sync::Arc,
};

use axum::Router;
use outreach_core_contact_contracts::ContactService;
use outreach_core_health_contracts::HealthFeatureService;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::info;

mod extractors;
mod middlewares;
mod models;
mod routes;

#[derive(Debug, Clone)]
pub struct RestServer<Health, Contact> {
    health: Health,
    contact: Contact,
    config: RestServerConfig,
}

#[derive(Debug, Clone)]
pub struct RestServerConfig {
    pub addr: SocketAddr,
    pub real_ip_config: Option<Arc<RestServerRealIpConfig>>,
    /// Directory with the static website, served for every path not handled
    /// by an api route.
    pub static_dir: Option<PathBuf>,
}

/// Trust the client ip reported in `header`, but only for requests coming
/// from the reverse proxy at `set_from`.
#[derive(Debug, Clone)]
pub struct RestServerRealIpConfig {
    pub header: String,
    pub set_from: IpAddr,
}

impl<Health, Contact> RestServer<Health, Contact>
where
    Health: HealthFeatureService,
    Contact: ContactService,
{
    pub fn new(health: Health, contact: Contact, config: RestServerConfig) -> Self {
        Self {
            health,
            contact,
            config,
        }
    }

    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = self.config.addr;
        let router = self.router();
        let listener = TcpListener::bind(addr).await?;
        info!("Listening on {addr}");

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutting down");
            }
        })
        .await
        .map_err(Into::into)
    }

    pub fn router(self) -> Router<()> {
        let Self {
            health,
            contact,
            config,
        } = self;

        let mut router = Router::new()
            .merge(routes::health::router(health.into()))
            .merge(routes::contact::router(contact.into()));

        if let Some(static_dir) = config.static_dir {
            router = router.fallback_service(ServeDir::new(static_dir));
        }

        let router = middlewares::trace::add(router);
        let router = middlewares::request_id::add(router);
        let router = middlewares::client_ip::add(config.real_ip_config)(router);
        middlewares::panic_handler::add(router)
    }
}
