use std::fmt;

use anyhow::{bail, Context};
use rand::{distributions::Alphanumeric, Rng};
use tower_sessions::cookie::Key;

/// `DATABASE_URL` value that selects the in-process backend.
pub const MEMORY_DATABASE_URL: &str = "memory://";

/// Bytes a session secret needs to derive a signing key.
pub const MIN_SECRET_LEN: usize = 64;

/// Longest accepted session lifetime, one year.
pub const MAX_TTL_HOURS: i64 = 24 * 365;

#[derive(Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_hours: i64,
    pub secure: bool,
    pub key: Key,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("cookie_name", &self.cookie_name)
            .field("ttl_hours", &self.ttl_hours)
            .field("secure", &self.secure)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub session: SessionConfig,
}

/// Parse `SESSION_TTL_HOURS`; unset means 24.
pub fn parse_ttl_hours(raw: Option<&str>) -> anyhow::Result<i64> {
    let Some(raw) = raw else {
        return Ok(24);
    };
    let hours: i64 = raw
        .trim()
        .parse()
        .with_context(|| format!("SESSION_TTL_HOURS is not a number: {raw:?}"))?;
    if !(1..=MAX_TTL_HOURS).contains(&hours) {
        bail!("SESSION_TTL_HOURS must be between 1 and {MAX_TTL_HOURS}, got {hours}");
    }
    Ok(hours)
}

/// Derive the cookie signing key from `SESSION_SECRET`.
pub fn signing_key(secret: &str) -> anyhow::Result<Key> {
    if secret.len() < MIN_SECRET_LEN {
        bail!("SESSION_SECRET must be at least {MIN_SECRET_LEN} bytes");
    }
    Ok(Key::from(secret.as_bytes()))
}

/// Throwaway secret for the in-memory backend; sessions die with the process anyway.
pub fn ephemeral_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(MIN_SECRET_LEN)
        .map(char::from)
        .collect()
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let port = match std::env::var("APP_PORT") {
            Ok(v) => v.parse::<u16>()?,
            Err(_) => 8080,
        };

        let secret = match std::env::var("SESSION_SECRET") {
            Ok(s) => s,
            Err(_) if database_url.starts_with(MEMORY_DATABASE_URL) => {
                tracing::warn!("SESSION_SECRET not set; using a per-process secret");
                ephemeral_secret()
            }
            Err(_) => bail!("SESSION_SECRET is not set"),
        };

        let session = SessionConfig {
            cookie_name: std::env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "stockroom.sid".into()),
            ttl_hours: parse_ttl_hours(std::env::var("SESSION_TTL_HOURS").ok().as_deref())?,
            secure: std::env::var("SESSION_COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            key: signing_key(&secret)?,
        };
        Ok(Self {
            database_url,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            session,
        })
    }

    pub fn uses_memory_backend(&self) -> bool {
        self.database_url.starts_with(MEMORY_DATABASE_URL)
    }
}
