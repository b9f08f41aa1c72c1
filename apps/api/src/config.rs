use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub port: u16,
    pub rust_log: String,
    pub match_cache_ttl_hours: i64,
    pub job_listing_days: i64,
    pub require_job_payment: bool,
    pub sweep_interval_secs: u64,
    pub max_resume_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            jwt_secret: require_env("JWT_SECRET")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            port: optional_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            match_cache_ttl_hours: optional_env("MATCH_CACHE_TTL_HOURS", 24)?,
            job_listing_days: optional_env("JOB_LISTING_DAYS", 30)?,
            require_job_payment: optional_env("REQUIRE_JOB_PAYMENT", true)?,
            sweep_interval_secs: optional_env("SWEEP_INTERVAL_SECS", 3600)?,
            max_resume_bytes: optional_env("MAX_RESUME_BYTES", 5 * 1024 * 1024)?,
        })
    }

    pub fn match_cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.match_cache_ttl_hours)
    }

    pub fn listing_duration(&self) -> chrono::Duration {
        chrono::Duration::days(self.job_listing_days)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'"))
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/execmatch_test".to_string(),
        jwt_secret: "test-secret".to_string(),
        s3_bucket: "resumes".to_string(),
        s3_endpoint: "http://localhost:9000".to_string(),
        aws_access_key_id: "minio".to_string(),
        aws_secret_access_key: "minio-secret".to_string(),
        port: 8080,
        rust_log: "info".to_string(),
        match_cache_ttl_hours: 24,
        job_listing_days: 30,
        require_job_payment: true,
        sweep_interval_secs: 3600,
        max_resume_bytes: 1024,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_accepts_port() {
        let port: u16 = parse_value("PORT", " 9090 ").unwrap();
        assert_eq!(port, 9090);
    }

    #[test]
    fn test_parse_value_rejects_garbage() {
        let err = parse_value::<u16>("PORT", "eighty").unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_parse_value_bool() {
        assert!(!parse_value::<bool>("REQUIRE_JOB_PAYMENT", "false").unwrap());
    }

    #[test]
    fn test_durations() {
        let config = test_config();
        assert_eq!(config.match_cache_ttl(), chrono::Duration::hours(24));
        assert_eq!(config.listing_duration(), chrono::Duration::days(30));
        assert_eq!(config.sweep_interval(), Duration::from_secs(3600));
    }
}
