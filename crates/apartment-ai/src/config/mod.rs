use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::finance::{ProjectionConfig, WaccEstimator};
use crate::pitch::PitchConfig;

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
    pub artifacts: ArtifactConfig,
    pub pitch: PitchConfig,
    pub finance: FinanceConfig,
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

        let artifacts = ArtifactConfig {
            model_dir: PathBuf::from(env::var("MODEL_DIR").unwrap_or_else(|_| "models".to_string())),
            chart_path: PathBuf::from(
                env::var("CHART_PATH").unwrap_or_else(|_| "static/projection.svg".to_string()),
            ),
        };

        let defaults = PitchConfig::default();
        let pitch = PitchConfig {
            enabled: parse_flag("PITCH_ENABLED", defaults.enabled)?,
            api_base: env::var("PITCH_API_BASE").unwrap_or(defaults.api_base),
            model: env::var("PITCH_MODEL").unwrap_or(defaults.model),
            max_tokens: parse_number("PITCH_MAX_TOKENS", defaults.max_tokens)?,
            timeout: Duration::from_secs(parse_number(
                "PITCH_TIMEOUT_SECS",
                defaults.timeout.as_secs(),
            )?),
            api_key_env: defaults.api_key_env,
        };

        let wacc = WaccEstimator::default();
        let projection = ProjectionConfig::default();
        let finance = FinanceConfig {
            wacc: WaccEstimator::new(
                parse_number("WACC_TAX_RATE", wacc.tax_rate)?,
                parse_number("WACC_EQUITY_RETURN", wacc.expected_equity_return)?,
            ),
            projection: ProjectionConfig {
                occupancy_rate: parse_number(
                    "PROJECTION_OCCUPANCY_RATE",
                    projection.occupancy_rate,
                )?,
                stock_return: parse_number("PROJECTION_STOCK_RETURN", projection.stock_return)?,
                ..projection
            },
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            artifacts,
            pitch,
            finance,
        })
    }
}

fn parse_number<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key, value }),
        Err(_) => Ok(default),
    }
}

fn parse_flag(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(key) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidFlag { key, value }),
        },
        Err(_) => Ok(default),
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

/// Where model artifacts are read from and the projection chart is written to.
#[derive(Debug, Clone)]
pub struct ArtifactConfig {
    pub model_dir: PathBuf,
    pub chart_path: PathBuf,
}

#[derive(Debug, Clone, Copy)]
pub struct FinanceConfig {
    pub wacc: WaccEstimator,
    pub projection: ProjectionConfig,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str, value: String },
    InvalidFlag { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be numeric, got '{value}'")
            }
            ConfigError::InvalidFlag { key, value } => {
                write!(f, "{key} must be true or false, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidFlag { .. } => None,
        }
    }
}
