//! Environment-driven application configuration.
//!
//! | Variable | Default | Meaning |
//! | -------- | ------- | ------- |
//! | `TASKLIST_HOST` | `0.0.0.0` | Listen address |
//! | `TASKLIST_PORT` | `8080` | Listen port |
//! | `TASKLIST_STORAGE` | `postgres` | `postgres` or `in_memory` |
//! | `DATABASE_URL` | none | Required for `postgres` |
//! | `TASKLIST_DATABASE_POOL_SIZE` | `10` | Maximum pooled connections |

use std::fmt;
use std::num::ParseIntError;
use thiserror::Error;

/// Listen address variable.
pub const HOST_VAR: &str = "TASKLIST_HOST";
/// Listen port variable.
pub const PORT_VAR: &str = "TASKLIST_PORT";
/// Storage backend variable.
pub const STORAGE_VAR: &str = "TASKLIST_STORAGE";
/// `PostgreSQL` connection URL variable.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
/// Connection pool size variable.
pub const POOL_SIZE_VAR: &str = "TASKLIST_DATABASE_POOL_SIZE";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_POOL_SIZE: u32 = 10;

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The port is not a valid TCP port number.
    #[error("TASKLIST_PORT must be a port number, got {value:?}: {reason}")]
    InvalidPort {
        /// The rejected value.
        value: String,
        /// Why parsing failed.
        reason: ParseIntError,
    },
    /// The storage backend name is unknown.
    #[error("TASKLIST_STORAGE must be `postgres` or `in_memory`, got {0:?}")]
    UnknownStorage(String),
    /// `postgres` storage was selected without a connection URL.
    #[error("DATABASE_URL is required when TASKLIST_STORAGE=postgres")]
    MissingDatabaseUrl,
    /// The pool size is not a positive integer.
    #[error("TASKLIST_DATABASE_POOL_SIZE must be a positive integer, got {0:?}")]
    InvalidPoolSize(String),
}

/// Storage backend selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageMode {
    /// `PostgreSQL` through a Diesel connection pool.
    Postgres {
        /// Connection URL.
        database_url: String,
        /// Maximum number of pooled connections.
        pool_size: u32,
    },
    /// Process-local store; contents are lost on exit.
    InMemory,
}

impl StorageMode {
    /// Returns the configuration name of the backend.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Postgres { .. } => "postgres",
            Self::InMemory => "in_memory",
        }
    }
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Application configuration, built once at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Listen address.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Storage backend.
    pub storage: StorageMode,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable holds an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let host = read(HOST_VAR).unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let port = read(PORT_VAR).map_or(Ok(DEFAULT_PORT), |value| {
            value
                .parse::<u16>()
                .map_err(|reason| ConfigError::InvalidPort { value, reason })
        })?;

        let storage = match read(STORAGE_VAR).as_deref() {
            None | Some("postgres") => {
                let database_url = read(DATABASE_URL_VAR).ok_or(ConfigError::MissingDatabaseUrl)?;
                let pool_size = read(POOL_SIZE_VAR).map_or(Ok(DEFAULT_POOL_SIZE), parse_pool_size)?;
                StorageMode::Postgres {
                    database_url,
                    pool_size,
                }
            }
            Some("in_memory") => StorageMode::InMemory,
            Some(other) => return Err(ConfigError::UnknownStorage(other.to_owned())),
        };

        Ok(Self {
            host,
            port,
            storage,
        })
    }

    /// Returns the `host:port` listen address.
    #[must_use]
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_pool_size(value: String) -> Result<u32, ConfigError> {
    match value.parse::<u32>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(ConfigError::InvalidPoolSize(value)),
    }
}
