//! Configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! - `SHOP_DATABASE_URL` - SQLite URL, falls back to `DATABASE_URL` (default: `sqlite://shopfront.db`)
//! - `SHOP_HOST` - Bind address (default: 127.0.0.1)
//! - `SHOP_PORT` - Listen port (default: 8083)
//! - `SHOP_SECURE_COOKIES` - Mark the session cookie `Secure` (default: false)
//! - `SHOP_SESSION_TTL_MINUTES` - Session inactivity expiry (default: 10080, one week)
//! - `SHOP_TAX_RATE_PERCENT` - Tax rate for cart quotes (default: 7.5)
//! - `SHOP_LOW_STOCK_THRESHOLD` - Dashboard "Low Stock" threshold (default: 5)
//! - `SHOP_ADMIN_USERNAME` / `SHOP_ADMIN_PASSWORD` - Admin account ensured at startup (both or neither)
//! - `NATS_URL` - Publish domain events to NATS

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

use crate::domain::pricing::DEFAULT_TAX_RATE;

const DEFAULT_DATABASE_URL: &str = "sqlite://shopfront.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: SecretString,
    pub host: IpAddr,
    pub port: u16,
    pub secure_cookies: bool,
    pub session_ttl_minutes: i64,
    pub tax_rate_percent: Decimal,
    pub low_stock_threshold: i64,
    pub admin: Option<AdminBootstrap>,
    pub nats_url: Option<String>,
}

/// Credentials for the admin account ensured at startup.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub password: SecretString,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let database_url = env
            .get("SHOP_DATABASE_URL")
            .or_else(|| env.get("DATABASE_URL"))
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let admin = match (env.get("SHOP_ADMIN_USERNAME"), env.get("SHOP_ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(AdminBootstrap { username, password: SecretString::from(password) }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::MissingEnvVar("SHOP_ADMIN_PASSWORD".into())),
            (None, Some(_)) => return Err(ConfigError::MissingEnvVar("SHOP_ADMIN_USERNAME".into())),
        };

        let low_stock_threshold = env.parse_or("SHOP_LOW_STOCK_THRESHOLD", 5_i64)?;
        if low_stock_threshold < 0 {
            return Err(ConfigError::InvalidEnvVar("SHOP_LOW_STOCK_THRESHOLD".into(), "must not be negative".into()));
        }
        let session_ttl_minutes = env.parse_or("SHOP_SESSION_TTL_MINUTES", 7 * 24 * 60_i64)?;
        if session_ttl_minutes <= 0 {
            return Err(ConfigError::InvalidEnvVar("SHOP_SESSION_TTL_MINUTES".into(), "must be positive".into()));
        }

        Ok(Self {
            database_url: SecretString::from(database_url),
            host: env.parse_or("SHOP_HOST", IpAddr::from([127, 0, 0, 1]))?,
            port: env.parse_or("SHOP_PORT", 8083_u16)?,
            secure_cookies: env.parse_or("SHOP_SECURE_COOKIES", false)?,
            session_ttl_minutes,
            tax_rate_percent: env.parse_or("SHOP_TAX_RATE_PERCENT", DEFAULT_TAX_RATE)?,
            low_stock_threshold,
            admin,
            nats_url: env.get("NATS_URL"),
        })
    }

    /// Returns the socket address for binding the server.
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Empty values count as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
            None => Ok(default),
        }
    }
}
