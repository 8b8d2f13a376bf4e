//! Process settings from environment variables (a `.env` file is honoured by the binary).

use crate::error::ConfigError;
use std::str::FromStr;

/// Which `BookStore` backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::UnknownStorage(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub body_limit_bytes: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `DATABASE_URL` wins; otherwise the URL is composed from the `DB_*` variables.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let database_url = match get("DATABASE_URL") {
            Some(url) => url,
            None => format!(
                "postgres://{}:{}@{}:{}/{}",
                or("DB_USERNAME", "postgres"),
                or("DB_PASSWORD", "password"),
                or("DB_HOST", "localhost"),
                parse_var::<u16>(&get, "DB_PORT", 5432)?,
                or("DB_NAME", "bookstore"),
            ),
        };

        Ok(Settings {
            database_url,
            max_connections: parse_var(&get, "DB_MAX_CONNECTIONS", 5)?,
            host: or("HOST", "0.0.0.0"),
            port: parse_var(&get, "PORT", 3000)?,
            storage: get("BOOKS_STORAGE")
                .map(|s| s.parse())
                .transpose()?
                .unwrap_or_default(),
            body_limit_bytes: parse_var(&get, "BODY_LIMIT_BYTES", 1024 * 1024)?,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(var) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var, value: raw }),
    }
}
