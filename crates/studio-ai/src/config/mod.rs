use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::platform::aggregation::{DirectoryError, LocationDirectory};
use crate::platform::token::PlatformCredentials;
use crate::routing::classifier::ClassifierConfig;
use crate::routing::rules::{RoutingRules, RulesError};

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
    pub platform: PlatformCredentials,
    pub classifier: ClassifierConfig,
    pub rules_path: Option<PathBuf>,
    pub locations_path: Option<PathBuf>,
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

        let platform = PlatformCredentials {
            base_url: env::var("PLATFORM_BASE_URL").ok(),
            basic_token: env::var("PLATFORM_BASIC_TOKEN").ok(),
            username: env::var("PLATFORM_USERNAME").ok(),
            password: env::var("PLATFORM_PASSWORD").ok(),
        };

        let mut classifier = ClassifierConfig::default();
        if let Ok(endpoint) = env::var("CLASSIFIER_ENDPOINT") {
            classifier.endpoint = endpoint;
        }
        classifier.api_key = env::var("CLASSIFIER_API_KEY").ok();
        if let Ok(model) = env::var("CLASSIFIER_MODEL") {
            classifier.model = model;
        }
        if let Ok(raw) = env::var("CLASSIFIER_MAX_TOKENS") {
            classifier.max_tokens = raw.parse().map_err(|_| ConfigError::InvalidMaxTokens)?;
        }

        let rules_path = env::var("ROUTING_RULES_PATH").ok().map(PathBuf::from);
        let locations_path = env::var("PLATFORM_LOCATIONS_PATH").ok().map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            platform,
            classifier,
            rules_path,
            locations_path,
        })
    }

    /// Routing tables: the bundled standard set unless a file overrides them.
    pub fn routing_rules(&self) -> Result<RoutingRules, RulesError> {
        match &self.rules_path {
            Some(path) => RoutingRules::from_path(path),
            None => Ok(RoutingRules::standard()),
        }
    }

    pub fn location_directory(&self) -> Result<LocationDirectory, DirectoryError> {
        match &self.locations_path {
            Some(path) => LocationDirectory::from_path(path),
            None => Ok(LocationDirectory::standard()),
        }
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidMaxTokens,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidMaxTokens => {
                write!(f, "CLASSIFIER_MAX_TOKENS must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidMaxTokens => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
