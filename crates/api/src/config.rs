use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host to bind to.
    pub host: String,
    /// Server port to bind to.
    pub port: u16,
    /// PostgreSQL connection URL. Posts are kept in memory when unset.
    pub database_url: Option<String>,
    /// Maximum database connections in the pool.
    pub db_max_connections: u32,
    /// Minimum database connections in the pool.
    pub db_min_connections: u32,
    /// Shared admin secret. Admin routes refuse everything when unset.
    pub admin_token: Option<String>,
    /// Mark the admin cookie `Secure`.
    pub secure_cookies: bool,
    /// Allowed browser origin for CORS; any origin when unset.
    pub cors_origin: Option<String>,
    /// Where accepted image uploads are written.
    pub upload_dir: PathBuf,
    /// Prefix for returned upload URLs, e.g. `https://cdn.example.com`.
    pub public_base_url: String,
    /// Event bus channel capacity.
    pub event_bus_capacity: usize,
    /// Largest accepted request body, in bytes.
    pub max_body_bytes: usize,
    /// Log level (e.g., "info", "debug", "trace").
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3030,
            database_url: None,
            db_max_connections: 20,
            db_min_connections: 5,
            admin_token: None,
            secure_cookies: false,
            cors_origin: None,
            upload_dir: PathBuf::from("uploads"),
            public_base_url: String::new(),
            event_bus_capacity: 1024,
            max_body_bytes: 6 * 1024 * 1024,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port, "u16")?,
            database_url: non_empty_var("DATABASE_URL"),
            db_max_connections: parse_var(
                "DB_MAX_CONNECTIONS",
                defaults.db_max_connections,
                "u32",
            )?,
            db_min_connections: parse_var(
                "DB_MIN_CONNECTIONS",
                defaults.db_min_connections,
                "u32",
            )?,
            admin_token: non_empty_var("ADMIN_SECRET_TOKEN"),
            secure_cookies: parse_var("COOKIE_SECURE", defaults.secure_cookies, "bool")?,
            cors_origin: non_empty_var("CORS_ORIGIN"),
            upload_dir: non_empty_var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.public_base_url),
            event_bus_capacity: parse_var(
                "EVENT_BUS_CAPACITY",
                defaults.event_bus_capacity,
                "usize",
            )?,
            max_body_bytes: parse_var("MAX_BODY_BYTES", defaults.max_body_bytes, "usize")?,
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }

    /// Build the socket address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Public URL of a stored upload.
    pub fn upload_url(&self, file_name: &str) -> String {
        format!("{}/uploads/{file_name}", self.public_base_url)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: FromStr>(
    name: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value,
            expected,
        }),
        Err(_) => Ok(default),
    }
}
