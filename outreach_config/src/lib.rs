use std::{
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context};
use config::{File, FileFormat};
pub use duration::Duration;
use outreach_models::email_address::{EmailAddress, EmailAddressWithName};
use serde::Deserialize;

mod duration;

pub const DEFAULT_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.toml");

/// Colon separated list of additional config files.
pub const CONFIG_PATHS_ENV: &str = "OUTREACH_CONFIG";

/// Loads the default configuration, overridden by the files listed in
/// `OUTREACH_CONFIG`.
pub fn load() -> anyhow::Result<Config> {
    let extra = std::env::var_os(CONFIG_PATHS_ENV).unwrap_or_default();
    let paths = std::iter::once(PathBuf::from(DEFAULT_CONFIG_PATH))
        .chain(std::env::split_paths(&extra).filter(|x| !x.as_os_str().is_empty()))
        .collect::<Vec<_>>();
    load_paths(&paths)
}

/// Loads the configuration by merging the given toml files, later files
/// overriding earlier ones.
pub fn load_paths(paths: &[impl AsRef<Path>]) -> anyhow::Result<Config> {
    paths
        .iter()
        .try_fold(config::Config::builder(), |builder, path| {
            let path = path.as_ref();
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file at {}", path.display()))?;
            let source = File::from_str(&content, FileFormat::Toml);
            anyhow::Ok(builder.add_source(source))
        })?
        .build()?
        .try_deserialize::<Config>()
        .context("Failed to load config")?
        .check()
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub http: HttpConfig,
    pub cache: CacheConfig,
    pub email: EmailConfig,
    pub contact: ContactConfig,
    pub health: HealthConfig,
}

impl Config {
    fn check(self) -> anyhow::Result<Self> {
        let sweep_interval = match &self.cache {
            CacheConfig::Memory { sweep_interval } => *sweep_interval,
            CacheConfig::Valkey(_) => None,
        };

        for (name, duration) in [
            ("cache.sweep_interval", sweep_interval),
            ("email.timeout", Some(self.email.timeout)),
            ("contact.rate_period", Some(self.contact.rate_period)),
            ("health.cache_ttl", Some(self.health.cache_ttl)),
        ] {
            ensure!(
                duration.map_or(true, |x| !x.is_zero()),
                "Invalid config: {name} must not be zero"
            );
        }

        Ok(self)
    }
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub address: SocketAddr,
    pub real_ip: Option<RealIpConfig>,
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct RealIpConfig {
    pub header: String,
    pub set_from: IpAddr,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum CacheConfig {
    Memory {
        /// How often expired entries are evicted. Without it, expired
        /// entries are only hidden, never removed.
        sweep_interval: Option<Duration>,
    },
    Valkey(ValkeyConfig),
}

#[derive(Debug, Deserialize)]
pub struct ValkeyConfig {
    pub url: String,
    #[serde(default)]
    pub key_prefix: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
}

#[derive(Debug, Deserialize)]
pub struct EmailConfig {
    pub from: EmailAddress,
    pub from_name: String,
    pub timeout: Duration,
    pub smtp: Option<SmtpConfig>,
    /// Used when no smtp server is configured.
    pub sendmail_command: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub security: SmtpSecurity,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    Tls,
    StartTls,
    None,
}

#[derive(Debug, Deserialize)]
pub struct ContactConfig {
    pub recipient: EmailAddressWithName,
    pub rate_limit: usize,
    pub rate_period: Duration,
    pub log_path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct HealthConfig {
    pub cache_ttl: Duration,
}
