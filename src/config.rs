//! Runtime settings loaded from the environment (and `.env`, if present).

use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_DATABASE_URL: &str = "credentials.db";
pub const DEFAULT_POOL_SIZE: u32 = 8;
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite file path. `:memory:` only makes sense with a pool of one.
    pub database_url: String,
    pub pool_size: u32,
    pub busy_timeout: Duration,
    /// How long to wait for a pooled connection before giving up.
    pub connect_timeout: Duration,
    pub bind_address: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            pool_size: DEFAULT_POOL_SIZE,
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
        }
    }
}

impl Config {
    /// Reads the process environment. `.env` is loaded by the binary before
    /// logging starts, so it is already merged in here.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            pool_size: parse_or(&lookup, "DB_POOL_SIZE", defaults.pool_size).max(1),
            busy_timeout: Duration::from_millis(parse_or(
                &lookup,
                "DB_BUSY_TIMEOUT_MS",
                DEFAULT_BUSY_TIMEOUT_MS,
            )),
            connect_timeout: Duration::from_millis(parse_or(
                &lookup,
                "DB_CONNECT_TIMEOUT_MS",
                DEFAULT_CONNECT_TIMEOUT_MS,
            ))
            .max(Duration::from_millis(1)),
            bind_address: lookup("BIND_ADDRESS").unwrap_or(defaults.bind_address),
        }
    }

    /// Settings for a database file at `path` with everything else defaulted.
    pub fn for_database(path: impl Into<String>) -> Self {
        Self {
            database_url: path.into(),
            ..Self::default()
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, fallback = %default, "ignoring unparsable setting");
            default
        }),
        None => default,
    }
}
