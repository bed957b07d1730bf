use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use chrono::FixedOffset;

use crate::shift::window::DEFAULT_UTC_OFFSET_MINUTES;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    /// token lifetime in seconds
    pub jwt_ttl: usize,
    /// public origin used for pagination links
    pub base_url: String,
    pub api_prefix: String,

    /// factory wall clock, minutes east of UTC
    pub utc_offset_minutes: i32,
    pub shift_cache_ttl_secs: u64,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,

    pub log_dir: String,
    pub log_level: tracing::Level,
    pub run_migrations: bool,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn optional<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .map_err(|e| anyhow!("invalid {key} value {raw:?}: {e}"))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_ttl: optional("JWT_TTL", "86400")?, // default 1 day
            base_url: optional("BASE_URL", "http://localhost:8080")?,
            api_prefix: optional("API_PREFIX", "/api")?,

            utc_offset_minutes: optional("UTC_OFFSET_MINUTES", &DEFAULT_UTC_OFFSET_MINUTES.to_string())?,
            shift_cache_ttl_secs: optional("SHIFT_CACHE_TTL_SECS", "600")?,

            rate_login_per_min: optional("RATE_LOGIN_PER_MIN", "60")?,
            rate_protected_per_min: optional("RATE_PROTECTED_PER_MIN", "1000")?,

            log_dir: optional("LOG_DIR", "logs")?,
            log_level: optional("LOG_LEVEL", "debug")?,
            run_migrations: optional("RUN_MIGRATIONS", "false")?,
        };

        config.factory_offset()?;
        Ok(config)
    }

    pub fn factory_offset(&self) -> Result<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| anyhow!("UTC_OFFSET_MINUTES out of range: {}", self.utc_offset_minutes))
    }
}
