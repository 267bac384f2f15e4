//! Environment-driven settings.
//!
//! Values are read once at startup. `main` loads a `.env` file first (via
//! `dotenvy`) so local runs and containers share the same variable names.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use sqlx::postgres::PgConnectOptions;
use tracing::warn;

use crate::error::ConfigError;

/// Signing key used when `DEBUG=true` and no `SECRET_KEY` is provided.
const DEV_SECRET_KEY: &str = "insecure-development-secret-key";

#[derive(Debug, Clone)]
pub struct Settings {
    pub secret_key: String,
    pub debug: bool,
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub static_root: PathBuf,
    /// Bearer token for the admin API. `None` leaves it unmounted.
    pub admin_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: IpAddr,
    pub port: u16,
}

impl ServerSettings {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    /// Full connection URL; takes precedence over the individual parts.
    pub url: Option<String>,
    pub name: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
}

impl DatabaseSettings {
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url).map_err(|_| ConfigError::Invalid {
                var: "DATABASE_URL",
                value: "<redacted>".to_string(),
            });
        }

        let mut options = PgConnectOptions::new().host(&self.host).port(self.port);
        if let Some(name) = &self.name {
            options = options.database(name);
        }
        if let Some(user) = &self.user {
            options = options.username(user);
        }
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        Ok(options)
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let debug = match get("DEBUG") {
            Some(raw) => parse_bool("DEBUG", &raw)?,
            None => false,
        };

        let secret_key = match get("SECRET_KEY") {
            Some(key) => key,
            None if debug => {
                warn!("SECRET_KEY not set, using the development key");
                DEV_SECRET_KEY.to_string()
            }
            None => return Err(ConfigError::Missing("SECRET_KEY")),
        };

        let server = ServerSettings {
            host: parse_or("HOST", get("HOST"), IpAddr::from([0, 0, 0, 0]))?,
            port: parse_or("PORT", get("PORT"), 3030)?,
        };

        let database = DatabaseSettings {
            url: get("DATABASE_URL"),
            name: get("DB_NAME"),
            user: get("DB_USER"),
            password: get("DB_PASSWORD"),
            host: get("DB_HOST").unwrap_or_else(|| "localhost".to_string()),
            port: parse_or("DB_PORT", get("DB_PORT"), 5432)?,
            max_connections: parse_or("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), 5)?,
        };

        Ok(Self {
            secret_key,
            debug,
            server,
            database,
            static_root: get("STATIC_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("staticfiles")),
            admin_token: get("ADMIN_TOKEN"),
        })
    }
}

fn parse_or<T: FromStr>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        None => Ok(default),
    }
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value: raw.to_string(),
        }),
    }
}
