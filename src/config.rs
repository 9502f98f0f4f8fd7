//! Process configuration read from the environment.
//!
//! `.env` files are honored via `dotenvy` (loaded by `main` before this runs).
//! Every knob has a default so the editor starts with no configuration at
//! all; without `DATABASE_URL` the remote tier is simply disabled.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path::PathBuf;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LAYOUT_CACHE_PATH: &str = "./layout-cache.json";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Postgres URL of the remote tier. `None` runs local-only.
    pub database_url: Option<String>,
    pub port: u16,
    /// Backing file of the local cache tier.
    pub layout_cache_path: PathBuf,
    pub db_max_connections: u32,
}

impl AppConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty()),
            port: env_parse("PORT", DEFAULT_PORT),
            layout_cache_path: std::env::var("LAYOUT_CACHE_PATH")
                .map_or_else(|_| PathBuf::from(DEFAULT_LAYOUT_CACHE_PATH), PathBuf::from),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
