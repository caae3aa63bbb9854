use anyhow::Context;
use std::env;

use crate::store::MAX_DELETE_BATCH;

/// Longest rolling window accepted from configuration or a request.
pub const MAX_WINDOW_DAYS: i64 = 3650;

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres document store; `None` runs against the in-memory store.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub cors_extra_origins: Vec<String>,

    pub jwt_secret: String,

    pub delete_batch_size: usize,
    pub rolling_window_days: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let delete_batch_size: usize = parse_var("DELETE_BATCH_SIZE", MAX_DELETE_BATCH)?;

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_var("PORT", 8080)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            cors_extra_origins: env::var("CORS_EXTRA_ORIGINS")
                .map(|extra| {
                    extra
                        .split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),

            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,

            delete_batch_size: delete_batch_size.clamp(1, MAX_DELETE_BATCH),
            rolling_window_days: check_window_days(parse_var("ROLLING_WINDOW_DAYS", 30)?)?,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn check_window_days(days: i64) -> anyhow::Result<i64> {
    if !(1..=MAX_WINDOW_DAYS).contains(&days) {
        anyhow::bail!("ROLLING_WINDOW_DAYS must be within 1..={MAX_WINDOW_DAYS}, got {days}");
    }
    Ok(days)
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a number, got {raw:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            host: "127.0.0.1".into(),
            port: 0,
            frontend_url: "http://localhost:3000".into(),
            cors_extra_origins: Vec::new(),
            jwt_secret: "test-secret".into(),
            delete_batch_size: MAX_DELETE_BATCH,
            rolling_window_days: 30,
        }
    }
}
