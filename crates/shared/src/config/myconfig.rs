use anyhow::{Result, anyhow};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub env: String,
    pub db_max_open_conns: u32,
    pub db_max_idle_time: Duration,
    pub query_timeout: Duration,
    pub run_migrations: bool,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn init() -> Result<Config> {
        Self::from_env(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from `lookup`. Only the DSN is mandatory;
    /// missing or unparsable values fall back to their defaults.
    pub fn from_env<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("PRODUCTS_DB_DSN")
            .filter(|dsn| !dsn.trim().is_empty())
            .ok_or_else(|| anyhow!("PRODUCTS_DB_DSN must be set"))?;

        let idle_minutes: u64 = parse_or(&lookup, "DB_MAX_IDLE_TIME", 25);
        let timeout_secs: u64 = parse_or(&lookup, "QUERY_TIMEOUT_SECS", 5);

        Ok(Config {
            database_url,
            port: parse_or(&lookup, "PORT", 4000),
            env: lookup("ENV").unwrap_or_else(|| "development".to_string()),
            db_max_open_conns: parse_or(&lookup, "DB_MAX_OPEN_CONN", 25),
            db_max_idle_time: Duration::from_secs(idle_minutes * 60),
            query_timeout: Duration::from_secs(timeout_secs),
            run_migrations: parse_or(&lookup, "RUN_MIGRATIONS", false),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(key).filter(|raw| !raw.trim().is_empty()) else {
        return default;
    };

    raw.trim().parse().unwrap_or_else(|_| {
        warn!("{key} has an invalid value {raw:?}, using the default");
        default
    })
}
