use crate::workflows::newsletter::{NumberLocale, DEFAULT_SOURCE_URL};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub newsletter: NewsletterConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            newsletter: NewsletterConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where spreadsheets come from and how they are downloaded.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub default_url: String,
    pub proxy_prefix: Option<String>,
    pub timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            default_url: DEFAULT_SOURCE_URL.to_string(),
            proxy_prefix: None,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewsletterConfig {
    pub source: SourceConfig,
    pub locale: NumberLocale,
    pub output_dir: PathBuf,
}

impl Default for NewsletterConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            locale: NumberLocale::default(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl NewsletterConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let default_url =
            non_blank_var("NEWSLETTER_SOURCE_URL").unwrap_or(defaults.source.default_url);

        let timeout = match non_blank_var("NEWSLETTER_FETCH_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout),
            },
            None => defaults.source.timeout,
        };

        let locale = match non_blank_var("NEWSLETTER_LOCALE") {
            Some(tag) => NumberLocale::parse(&tag).ok_or(ConfigError::InvalidLocale(tag))?,
            None => defaults.locale,
        };

        Ok(Self {
            source: SourceConfig {
                default_url,
                proxy_prefix: non_blank_var("NEWSLETTER_FETCH_PROXY"),
                timeout,
            },
            locale,
            output_dir: non_blank_var("NEWSLETTER_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
        })
    }
}

fn non_blank_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTimeout,
    InvalidLocale(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTimeout => write!(
                f,
                "NEWSLETTER_FETCH_TIMEOUT_SECS must be a positive number of seconds"
            ),
            ConfigError::InvalidLocale(tag) => write!(
                f,
                "NEWSLETTER_LOCALE '{}' is not supported (use es-ES or en-US)",
                tag
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidTimeout
            | ConfigError::InvalidLocale(_) => None,
        }
    }
}
