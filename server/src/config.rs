//! Environment-backed configuration for the submission gateway.
//!
//! All process configuration is read once at startup into [`AppConfig`]
//! and passed down explicitly; handlers never reach for `env::var`
//! themselves. `.env` loading happens in `main` via `dotenvy` before this
//! module runs.

use std::env;
use std::time::Duration;

/// SMTP relay settings for outbound contact email.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    /// Mailbox that receives contact-form submissions.
    pub recipient: String,
}

/// SurrealDB connection settings for the application store.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Engine endpoint, e.g. `http://127.0.0.1:8000` or `mem://` in tests.
    pub endpoint: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

/// Abuse-gating policy knobs. These are configuration, not magic numbers:
/// deployments can tighten or relax them without a rebuild.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: String,
    pub smtp: SmtpConfig,
    pub database: DatabaseConfig,
    pub rate_limit: RateLimitConfig,
    /// Submissions arriving sooner than this after the form was loaded are
    /// treated as scripted.
    pub min_fill_time: Duration,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Reads configuration from the process environment, falling back to
    /// development defaults for anything unset.
    pub fn from_env() -> Self {
        let smtp_user = env_or("SMTP_USER", "");
        let recipient = env::var("CONTACT_RECIPIENT").unwrap_or_else(|_| smtp_user.clone());

        Self {
            listen_addr: env_or("LISTEN_ADDR", "127.0.0.1:3000"),
            smtp: SmtpConfig {
                host: env_or("SMTP_HOST", ""),
                user: smtp_user,
                password: env_or("SMTP_PASSWORD", ""),
                recipient,
            },
            database: DatabaseConfig {
                endpoint: env_or("SURREAL_ENDPOINT", "http://127.0.0.1:8000"),
                namespace: env_or("SURREAL_NS", "provira"),
                database: env_or("SURREAL_DB", "provira"),
                username: env_or("SURREAL_USER", ""),
                password: env_or("SURREAL_PASS", ""),
            },
            rate_limit: RateLimitConfig {
                max_requests: env_parse("RATE_LIMIT_MAX", 5),
                window: Duration::from_secs(env_parse("RATE_LIMIT_WINDOW_SECS", 3600)),
            },
            min_fill_time: Duration::from_millis(env_parse("MIN_FILL_MILLIS", 3000)),
        }
    }
}

/// Ensures all required environment variables are set for production.
///
/// Development runs work on defaults; a production deployment with a
/// missing SMTP relay or database would silently drop every submission, so
/// the server refuses to start instead.
pub fn validate_production_env() -> Result<(), Vec<String>> {
    let is_production =
        env::var("RUST_ENV").unwrap_or_else(|_| "development".to_owned()) == "production";
    if !is_production {
        return Ok(());
    }

    let mut errors = Vec::new();

    for var in [
        "SMTP_HOST",
        "SMTP_USER",
        "SMTP_PASSWORD",
        "CONTACT_RECIPIENT",
        "SURREAL_ENDPOINT",
    ] {
        if env::var(var).is_err() {
            errors.push(format!("Missing required environment variable: {var}"));
        }
    }

    let has_db_creds = env::var("SURREAL_USER").is_ok() && env::var("SURREAL_PASS").is_ok();
    if !has_db_creds {
        errors.push("No database credentials found. Set SURREAL_USER/SURREAL_PASS".to_owned());
    }
    if let Ok(password) = env::var("SURREAL_PASS") {
        if password.len() < 8 {
            errors
                .push("SURREAL_PASS is too weak (minimum 8 characters required)".to_owned());
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_defaults() {
        let config = AppConfig::from_env();
        // Defaults apply whenever the env vars are unset in the test run.
        if env::var("RATE_LIMIT_MAX").is_err() {
            assert_eq!(config.rate_limit.max_requests, 5);
        }
        if env::var("RATE_LIMIT_WINDOW_SECS").is_err() {
            assert_eq!(config.rate_limit.window, Duration::from_secs(3600));
        }
        if env::var("MIN_FILL_MILLIS").is_err() {
            assert_eq!(config.min_fill_time, Duration::from_millis(3000));
        }
    }

    #[test]
    fn test_env_parse_ignores_garbage() {
        env::set_var("TEST_ENV_PARSE_GARBAGE", "not-a-number");
        let parsed: u32 = env_parse("TEST_ENV_PARSE_GARBAGE", 7);
        assert_eq!(parsed, 7);
        env::remove_var("TEST_ENV_PARSE_GARBAGE");
    }

    #[test]
    fn test_validate_production_env_noop_in_development() {
        if env::var("RUST_ENV").map(|v| v == "production") != Ok(true) {
            assert!(validate_production_env().is_ok());
        }
    }
}
