//! Typed configuration from environment variables.
//!
//! Loads once at startup, fails fast if required vars are missing or
//! malformed. The database URL is wrapped in `secrecy::SecretString` so it
//! never ends up in logs.

use std::net::SocketAddr;

use secrecy::SecretString;

use crate::error::{Error, Result};
use crate::model::UserId;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug)]
pub struct Config {
    /// Required unless the server runs against the in-memory store.
    pub database_url: Option<SecretString>,
    pub bind_addr: SocketAddr,
    /// Acting principal for incident reports until an auth layer exists.
    pub acting_user: UserId,
    pub seed_on_boot: bool,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| Error::Config(format!("BIND_ADDR {bind_addr:?} is not a socket address: {e}")))?;

        let acting_user = match lookup("WORKSHOP_USER_ID") {
            Some(raw) => UserId(
                raw.trim()
                    .parse::<i64>()
                    .map_err(|e| Error::Config(format!("WORKSHOP_USER_ID {raw:?} is not an id: {e}")))?,
            ),
            None => UserId(1),
        };

        let seed_on_boot = match lookup("SEED_ON_BOOT") {
            Some(raw) => parse_flag("SEED_ON_BOOT", &raw)?,
            None => true,
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .filter(|url| !url.is_empty())
                .map(SecretString::from),
            bind_addr,
            acting_user,
            seed_on_boot,
            otel_endpoint: lookup("OTEL_ENDPOINT").filter(|e| !e.is_empty()),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// The database URL, or a config error naming the missing variable.
    pub fn require_database_url(&self) -> Result<&SecretString> {
        self.database_url.as_ref().ok_or_else(|| {
            Error::Config("required environment variable DATABASE_URL is not set".to_string())
        })
    }
}

fn parse_flag(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Config(format!("{name} {raw:?} is not a boolean"))),
    }
}
