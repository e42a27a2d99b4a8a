use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use time::UtcOffset;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";
pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_ROUTING_TIMEOUT_MS: u64 = 3000;
pub const DEFAULT_FALLBACK_SPEED_KMH: f64 = 40.0;

const OFFSET_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[offset_hour sign:mandatory]:[offset_minute]");

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub app: AppSection,
    pub logging: LoggingSection,
    #[serde(default)]
    pub catalog: Option<CatalogSection>,
    #[serde(default)]
    pub beds: Option<BedsSection>,
    #[serde(default)]
    pub routing: Option<RoutingSection>,
    #[serde(default)]
    pub server: Option<ServerSection>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSection {
    pub name: String,
    /// Offset such as "+09:00" or "+05:30" applied to "now" and to
    /// arrival-time labels (default: UTC)
    #[serde(default)]
    pub utc_offset: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSection {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogSection {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BedsSection {
    /// JSON array of observations loaded into the in-memory store at startup
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RoutingSection {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    /// Request timeout in milliseconds (default: 3000)
    pub timeout_ms: Option<u64>,
    /// Average speed for straight-line estimates (default: 40 km/h)
    pub fallback_speed_kmh: Option<f64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSection {
    /// Port to listen on (default: 8080)
    pub port: Option<u16>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid utc offset {0:?}, expected e.g. \"+09:00\"")]
    Offset(String),
}

pub fn load_default() -> Result<Config, ConfigError> {
    load_from_path(DEFAULT_CONFIG_PATH)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    config.utc_offset()?;
    Ok(config)
}

fn non_empty(path: Option<&Path>) -> Option<&Path> {
    path.filter(|path| !path.as_os_str().is_empty())
}

impl Config {
    pub fn catalog_path(&self) -> Option<&Path> {
        non_empty(self.catalog.as_ref()?.path.as_deref())
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        non_empty(self.beds.as_ref()?.snapshot_path.as_deref())
    }

    pub fn utc_offset(&self) -> Result<UtcOffset, ConfigError> {
        match self.app.utc_offset.as_deref() {
            None => Ok(UtcOffset::UTC),
            Some(raw) => UtcOffset::parse(raw.trim(), OFFSET_FORMAT)
                .map_err(|_| ConfigError::Offset(raw.to_string())),
        }
    }

    pub fn log_level(&self) -> tracing::Level {
        self.logging.level.parse().unwrap_or(tracing::Level::INFO)
    }

    /// Directions endpoint and key, present only when both are configured.
    pub fn routing_api(&self) -> Option<(&str, &str)> {
        let routing = self.routing.as_ref()?;
        let endpoint = routing.endpoint.as_deref().filter(|s| !s.is_empty())?;
        let api_key = routing.api_key.as_deref().filter(|s| !s.is_empty())?;
        Some((endpoint, api_key))
    }

    pub fn routing_timeout(&self) -> Duration {
        let millis = self
            .routing
            .as_ref()
            .and_then(|r| r.timeout_ms)
            .unwrap_or(DEFAULT_ROUTING_TIMEOUT_MS);
        Duration::from_millis(millis)
    }

    pub fn fallback_speed_kmh(&self) -> f64 {
        self.routing
            .as_ref()
            .and_then(|r| r.fallback_speed_kmh)
            .unwrap_or(DEFAULT_FALLBACK_SPEED_KMH)
    }

    /// Returns the server port (default: 8080)
    pub fn server_port(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|s| s.port)
            .unwrap_or(DEFAULT_SERVER_PORT)
    }
}
