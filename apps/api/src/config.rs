use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Upper bound on how many published slugs the static pass enumerates.
    pub static_params_limit: i64,
    pub db_max_connections: u32,
    /// Total attempts (first try included) for a store query hitting a transient error.
    pub db_retry_attempts: u32,
    pub prerender_on_start: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: parse_env("PORT", "8080").context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            static_params_limit: parse_env("STATIC_PARAMS_LIMIT", "100")
                .context("STATIC_PARAMS_LIMIT must be a positive integer")?,
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", "10")
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
            db_retry_attempts: parse_env("DB_RETRY_ATTEMPTS", "3")
                .context("DB_RETRY_ATTEMPTS must be a positive integer")?,
            prerender_on_start: parse_env("PRERENDER_ON_START", "true")
                .context("PRERENDER_ON_START must be true or false")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    Ok(raw.trim().parse::<T>()?)
}

#[cfg(test)]
impl Config {
    /// Fixed configuration for handler tests; no environment access.
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/flow_test".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            static_params_limit: 100,
            db_max_connections: 1,
            db_retry_attempts: 1,
            prerender_on_start: false,
        }
    }
}
