//! Configuration loaded from environment variables at startup. A `.env` file
//! is honoured for local development.

use std::time::Duration;

use chrono::FixedOffset;

use crate::reviews::QuotaPolicy;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub redis_url: String,
    pub jwt_secret: String,
    pub allowed_origins: Vec<String>,
    pub quota: QuotaPolicy,
    pub request_timeout: Duration,
    pub run_migrations: bool,
}

fn utc_offset_from_minutes(minutes: i32) -> Result<FixedOffset, ConfigError> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| {
            ConfigError::InvalidValue(
                "QUOTA_UTC_OFFSET_MINUTES".to_string(),
                format!("{} is outside ±24h", minutes),
            )
        })
}

fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name.to_string()))
}

fn parsed<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let database_url = required("DATABASE_URL")?;
        let redis_url = required("REDIS_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let port = parsed("PORT", 3001u16)?;

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let daily_limit = parsed("REVIEW_DAILY_LIMIT", 10u32)?;
        if daily_limit == 0 {
            return Err(ConfigError::InvalidValue(
                "REVIEW_DAILY_LIMIT".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let utc_offset = utc_offset_from_minutes(parsed("QUOTA_UTC_OFFSET_MINUTES", 0i32)?)?;

        let fail_open = parsed("QUOTA_FAIL_OPEN", false)?;
        let request_timeout = Duration::from_secs(parsed("REQUEST_TIMEOUT_SECS", 10u64)?);
        let run_migrations = parsed("RUN_MIGRATIONS", false)?;

        Ok(Self {
            port,
            database_url,
            redis_url,
            jwt_secret,
            allowed_origins,
            quota: QuotaPolicy {
                daily_limit,
                utc_offset,
                fail_open,
            },
            request_timeout,
            run_migrations,
        })
    }
}
