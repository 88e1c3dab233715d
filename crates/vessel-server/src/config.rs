//! Server configuration from environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_path: String,
    pub database_max_connections: u32,
    /// Seed file loaded into the fuel table on startup
    pub fuel_table_path: Option<String>,
    pub weather_api_url: String,
    pub weather_api_key: String,
    pub weather_timeout_s: u64,
    pub weather_max_attempts: u32,
    pub weather_retry_base_ms: u64,
    pub weather_retry_max_ms: u64,
    pub weather_cache_ttl_s: u64,
    pub weather_cache_max_entries: usize,
    /// Deadline for a single estimation request
    pub request_timeout_s: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_port: parse_env("VESSEL_PORT", 3000),
            database_path: env::var("VESSEL_DATABASE_PATH")
                .unwrap_or_else(|_| "data/vessels.db".to_string()),
            database_max_connections: parse_env("VESSEL_DATABASE_MAX_CONNECTIONS", 5),
            fuel_table_path: env::var("FUEL_TABLE_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            weather_api_url: env::var("WEATHER_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080/weather".to_string()),
            weather_api_key: env::var("WEATHER_API_KEY").unwrap_or_default(),
            weather_timeout_s: parse_env("WEATHER_TIMEOUT_S", 10),
            weather_max_attempts: parse_env("WEATHER_MAX_ATTEMPTS", 3),
            weather_retry_base_ms: parse_env("WEATHER_RETRY_BASE_MS", 200),
            weather_retry_max_ms: parse_env("WEATHER_RETRY_MAX_MS", 2000),
            weather_cache_ttl_s: parse_env("WEATHER_CACHE_TTL_S", 86_400),
            weather_cache_max_entries: parse_env("WEATHER_CACHE_MAX_ENTRIES", 4096),
            request_timeout_s: parse_env("REQUEST_TIMEOUT_S", 15),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_s.max(1))
    }
}

fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
