//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub db_max_connections: u32,
    pub log_level: Level,
    /// Origin that join links are built on, e.g. `https://sage.example`.
    pub public_origin: String,
    /// Browser origin allowed to call the API.
    pub cors_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let db_max_connections = match std::env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw.parse::<u32>().map_err(|e| {
                ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string(), e.to_string())
            })?,
            Err(_) => 5,
        };

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Public Surface Settings ---
        let public_origin = normalize_origin(
            "PUBLIC_ORIGIN",
            std::env::var("PUBLIC_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string()),
        )?;
        let cors_origin = normalize_origin(
            "CORS_ORIGIN",
            std::env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:4200".to_string()),
        )?;

        Ok(Self {
            bind_address,
            database_url,
            db_max_connections,
            log_level,
            public_origin,
            cors_origin,
        })
    }
}

/// Trims trailing slashes and checks the value looks like an http(s) origin.
fn normalize_origin(var: &str, raw: String) -> Result<String, ConfigError> {
    let origin = raw.trim().trim_end_matches('/').to_string();
    if !(origin.starts_with("http://") || origin.starts_with("https://")) {
        return Err(ConfigError::InvalidValue(
            var.to_string(),
            format!("'{}' is not an http(s) origin", raw),
        ));
    }
    Ok(origin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_lose_trailing_slashes() {
        assert_eq!(
            normalize_origin("PUBLIC_ORIGIN", "https://sage.example/".to_string()).unwrap(),
            "https://sage.example"
        );
        assert!(matches!(
            normalize_origin("PUBLIC_ORIGIN", "sage.example".to_string()),
            Err(ConfigError::InvalidValue(var, _)) if var == "PUBLIC_ORIGIN"
        ));
    }

    const ENV_VARS: [&str; 6] = [
        "DATABASE_URL",
        "BIND_ADDRESS",
        "CORS_ORIGIN",
        "PUBLIC_ORIGIN",
        "DB_MAX_CONNECTIONS",
        "RUST_LOG",
    ];

    // The only test in this crate that touches the process environment.
    // Whatever it finds is put back before it returns.
    #[test]
    fn loads_from_environment() {
        let saved: Vec<(&str, Option<String>)> = ENV_VARS
            .iter()
            .map(|var| (*var, std::env::var(var).ok()))
            .collect();
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::MissingVar(var)) if var == "DATABASE_URL"
        ));

        std::env::set_var("DATABASE_URL", "postgres://sage@localhost/sage");
        std::env::set_var("PUBLIC_ORIGIN", "https://play.sage.example/");
        std::env::set_var("DB_MAX_CONNECTIONS", "9");
        std::env::set_var("RUST_LOG", "debug");
        let config = Config::from_env().unwrap();
        assert_eq!(config.public_origin, "https://play.sage.example");
        assert_eq!(config.db_max_connections, 9);
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.bind_address.port(), 3000);

        std::env::set_var("DB_MAX_CONNECTIONS", "many");
        let invalid = Config::from_env();

        for (var, value) in &saved {
            match value {
                Some(value) => std::env::set_var(var, value),
                None => std::env::remove_var(var),
            }
        }
        assert!(invalid.is_err());
        for (var, value) in &saved {
            assert_eq!(&std::env::var(var).ok(), value);
        }
    }
}
