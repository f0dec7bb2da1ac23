//! Server settings read from the environment.
//!
//! | Variable                      | Default   |
//! |-------------------------------|-----------|
//! | `SOCKETMON_HOST`              | `0.0.0.0` |
//! | `SOCKETMON_PORT`              | `3001`    |
//! | `SOCKETMON_GRID_SIZE`         | `8`       |
//! | `SOCKETMON_IDLE_TIMEOUT_SECS` | `300`     |
//!
//! Unset means default. A set but unparseable value is an error, so a
//! typo doesn't silently start the server on the wrong port.

use std::time::Duration;

use socketmon::game::{GameError, GridConfig};
use socketmon::DEFAULT_IDLE_TIMEOUT;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3001;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: cannot parse {value:?}")]
    Invalid { var: &'static str, value: String },

    #[error("SOCKETMON_GRID_SIZE: {0}")]
    Grid(#[from] GameError),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub grid: GridConfig,
    pub idle_timeout: Duration,
}

impl ServerConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds a config from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("SOCKETMON_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse(&lookup, "SOCKETMON_PORT")?.unwrap_or(DEFAULT_PORT);
        let grid = match parse::<u8>(&lookup, "SOCKETMON_GRID_SIZE")? {
            Some(size) => GridConfig::new(size)?,
            None => GridConfig::default(),
        };
        let idle_timeout = parse(&lookup, "SOCKETMON_IDLE_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_IDLE_TIMEOUT);

        Ok(Self {
            host,
            port,
            grid,
            idle_timeout,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}
