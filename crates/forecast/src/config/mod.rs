mod election;

pub use election::{Candidates, ElectionConfig, ElectoralVoteConfig, MapColors, RatingMargins};

use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

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
    pub data: DataConfig,
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

        let data_dir = env::var("FORECAST_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DataConfig::DEFAULT_DATA_DIR));
        let election_config_path = env::var("FORECAST_CONFIG_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            data: DataConfig {
                data_dir,
                election_config_path,
            },
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where forecast inputs live.
#[derive(Debug, Clone)]
pub struct DataConfig {
    /// Directory holding `evs.json` and `probabilities.json`.
    pub data_dir: PathBuf,
    /// Optional election config JSON; the built-in defaults apply otherwise.
    pub election_config_path: Option<PathBuf>,
}

impl DataConfig {
    pub const DEFAULT_DATA_DIR: &'static str = "assets/json";

    pub fn election(&self) -> Result<ElectionConfig, ConfigError> {
        match &self.election_config_path {
            Some(path) => ElectionConfig::from_path(path),
            None => Ok(ElectionConfig::default()),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    ElectionFile {
        path: String,
        source: std::io::Error,
    },
    ElectionJson {
        source: serde_json::Error,
    },
    NegativeMargin,
    ElectoralVoteOverflow,
    NonMonotonicMargins {
        solid: f64,
        likely: f64,
        lean: f64,
        tilt: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::ElectionFile { path, .. } => {
                write!(f, "unable to read election config '{}'", path)
            }
            ConfigError::ElectionJson { source } => {
                write!(f, "election config is not valid JSON: {}", source)
            }
            ConfigError::NegativeMargin => {
                write!(f, "rating margins must be finite and non-negative")
            }
            ConfigError::ElectoralVoteOverflow => {
                write!(f, "electoral vote totals do not fit in a u32")
            }
            ConfigError::NonMonotonicMargins {
                solid,
                likely,
                lean,
                tilt,
            } => write!(
                f,
                "rating margins must satisfy solid >= likely >= lean >= tilt (got {solid}, {likely}, {lean}, {tilt})"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::ElectionFile { source, .. } => Some(source),
            ConfigError::ElectionJson { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::NegativeMargin
            | ConfigError::ElectoralVoteOverflow
            | ConfigError::NonMonotonicMargins { .. } => None,
        }
    }
}
